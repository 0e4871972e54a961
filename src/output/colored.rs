//! Colored formatter implementation with terminal color support

use super::formatter::{
    format_diagnostics, html_to_text, wrap_text, FormattingOptions, OutputFormatter,
};
use crate::{
    error::{ErrorKind, Result},
    models::{AnalysisContext, FailureDiagnostics, NormalizedMetrics},
};
use colored::*;

/// Quality classification used for color coding a metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    /// Sentinel value, nothing was measured
    Unavailable,
}

impl QualityLevel {
    /// Classify a download or upload rate in Mbit/s
    pub fn from_throughput(mbit: f64) -> Self {
        if mbit >= 100.0 {
            Self::Excellent
        } else if mbit >= 25.0 {
            Self::Good
        } else if mbit >= 5.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Classify a round-trip latency in milliseconds
    pub fn from_latency(ms: f64) -> Self {
        if ms < 20.0 {
            Self::Excellent
        } else if ms < 50.0 {
            Self::Good
        } else if ms < 100.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::Unavailable => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Unavailable => "Unavailable",
        }
    }
}

/// Leading number of a display value such as `"50.0 Mbit/s"` or `"20 ms"`
pub fn leading_number(display: &str) -> Option<f64> {
    display.split_whitespace().next()?.parse().ok()
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub label: Color,
    pub error: Color,
    pub warning: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            label: Color::White,
            error: Color::Red,
            warning: Color::Yellow,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn metric_line(&self, label: &str, value: &str, level: QualityLevel) -> String {
        let label = format!("{:<10}", label);
        let tag = format!("({})", level.description());
        format!(
            "  {} {} {}",
            self.colorize(&label, self.color_scheme.label),
            self.emphasize(value, level.color()),
            self.colorize(&tag, self.color_scheme.muted)
        )
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "=".repeat(title.len() + 4);
        Ok(format!(
            "{}\n  {}  \n{}",
            self.colorize(&border, self.color_scheme.header),
            self.emphasize(title, self.color_scheme.header),
            self.colorize(&border, self.color_scheme.header)
        ))
    }

    fn format_metrics(&self, metrics: &NormalizedMetrics) -> Result<String> {
        let throughput = |value: &str| {
            leading_number(value).map_or(QualityLevel::Unavailable, QualityLevel::from_throughput)
        };
        let latency = leading_number(&metrics.ping).map_or(QualityLevel::Unavailable, QualityLevel::from_latency);

        Ok([
            self.metric_line("Download:", &metrics.download, throughput(&metrics.download)),
            self.metric_line("Upload:", &metrics.upload, throughput(&metrics.upload)),
            self.metric_line("Ping:", &metrics.ping, latency),
        ]
        .join("\n"))
    }

    fn format_context(&self, context: &AnalysisContext) -> Result<String> {
        Ok(format!(
            "  {} {}",
            self.colorize(&format!("{:<10}", "Context:"), self.color_scheme.label),
            self.colorize(context.as_str(), self.color_scheme.muted)
        ))
    }

    fn format_analysis(&self, analysis: &str) -> Result<String> {
        let text = wrap_text(&html_to_text(analysis), self.options.max_width, "  ");
        Ok(format!("{}\n{}", self.bold("Analysis:"), text))
    }

    fn format_failure(
        &self,
        kind: ErrorKind,
        message: &str,
        diagnostics: Option<&FailureDiagnostics>,
    ) -> Result<String> {
        let mut output = format!(
            "{} {}",
            self.emphasize(&format!("{}:", kind), self.color_scheme.error),
            message
        );

        if kind.is_recoverable() {
            output.push('\n');
            output.push_str(&self.format_warning("This failure is usually transient; running again may succeed")?);
        }

        if self.options.verbose_mode {
            if let Some(diagnostics) = diagnostics {
                output.push('\n');
                output.push_str(&self.colorize(&format_diagnostics(diagnostics)?, self.color_scheme.muted).to_string());
            }
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("ERROR:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("WARNING:", self.color_scheme.warning), warning))
    }
}
