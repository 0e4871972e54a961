//! Output formatting for measurement results
//!
//! Text reports come from an [`OutputFormatter`]; the JSON response shape is
//! produced from [`ApiResponse`].

mod colored;
mod formatter;

pub use colored::{leading_number, ColorScheme, ColoredFormatter, QualityLevel};
pub use formatter::{
    format_diagnostics, html_to_text, wrap_text, FormattingOptions, OutputFormatter, PlainFormatter,
};

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, Config, TestResult},
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    pub fn for_config(config: &Config) -> Box<dyn OutputFormatter> {
        Self::create_formatter(config.enable_color, config.verbose || config.debug)
    }
}

/// Pretty-printed JSON response for a result
pub fn render_json(result: &TestResult) -> Result<String> {
    serde_json::to_string_pretty(&ApiResponse::from(result))
        .map_err(|e| AppError::internal(format!("Failed to serialize response: {}", e)))
}

/// Render a result the way the configuration asks for
pub fn render_result(result: &TestResult, config: &Config) -> Result<String> {
    if config.json_output {
        render_json(result)
    } else {
        OutputFormatterFactory::for_config(config).format_result(result)
    }
}
