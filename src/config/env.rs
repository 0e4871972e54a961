//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    ///
    /// Variables already present in the process environment win over the file.
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Network Speed Reporter Configuration
#
# Values set here are used as defaults and can be overridden by the process
# environment or by command-line arguments.

# Measurement tool and its arguments (whitespace-separated)
# SPEEDTEST_COMMAND=speedtest
# SPEEDTEST_ARGS=--json

# Hard deadline for one measurement, in seconds (1-600)
# MEASUREMENT_TIMEOUT_SECONDS=30

# Maximum number of measurements running at once (1-64)
# MAX_CONCURRENT_MEASUREMENTS=2

# Analysis service credential (required)
GEMINI_API_KEY=

# Analysis model and endpoint
# GEMINI_MODEL=gemini-2.5-flash
# GEMINI_API_BASE_URL=https://generativelanguage.googleapis.com

# HTTP timeout for analysis requests, in seconds (1-300)
# ANALYSIS_TIMEOUT_SECONDS=60

# Context used when none is given on the command line
# DEFAULT_CONTEXT=I'm just browsing the web.

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example configurations for different scenarios:
#
# Ookla CLI instead of speedtest-cli:
# SPEEDTEST_COMMAND=/usr/bin/speedtest
# SPEEDTEST_ARGS=--format=json --accept-license
#
# Slow links:
# MEASUREMENT_TIMEOUT_SECONDS=90
"#
        .to_string()
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "SPEEDTEST_COMMAND" | "GEMINI_MODEL" | "DEFAULT_CONTEXT" | "GEMINI_API_KEY" => {
                if value.trim().is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "MEASUREMENT_TIMEOUT_SECONDS" => {
                Self::validate_range(key, value, 1, crate::defaults::MAX_TIMEOUT_SECS)?;
            }
            "ANALYSIS_TIMEOUT_SECONDS" => {
                Self::validate_range(key, value, 1, crate::defaults::MAX_ANALYSIS_TIMEOUT_SECS)?;
            }
            "MAX_CONCURRENT_MEASUREMENTS" => {
                Self::validate_range(key, value, 1, crate::defaults::MAX_CONCURRENT_LIMIT as u64)?;
            }
            "GEMINI_API_BASE_URL" => {
                let parsed = url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid GEMINI_API_BASE_URL '{}': {}", value, e)))?;
                if parsed.scheme() != "https" && parsed.scheme() != "http" {
                    return Err(AppError::config(format!(
                        "GEMINI_API_BASE_URL must use HTTP(S): {}",
                        value
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_range(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let number: u64 = value
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;

        if number < min || number > max {
            return Err(AppError::config(format!(
                "{} must be between {} and {}, got: {}",
                key, min, max, number
            )));
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDTEST_COMMAND", "Measurement tool program name or path", "speedtest"),
            ("SPEEDTEST_ARGS", "Whitespace-separated tool arguments", "--json"),
            ("MEASUREMENT_TIMEOUT_SECONDS", "Measurement deadline in seconds (1-600)", "30"),
            ("MAX_CONCURRENT_MEASUREMENTS", "Simultaneous measurements allowed (1-64)", "2"),
            ("GEMINI_API_KEY", "Analysis service API key (required)", "AIza..."),
            ("GEMINI_MODEL", "Analysis model name", "gemini-2.5-flash"),
            ("GEMINI_API_BASE_URL", "Analysis service base URL", "https://generativelanguage.googleapis.com"),
            ("ANALYSIS_TIMEOUT_SECONDS", "Analysis request timeout in seconds (1-300)", "60"),
            ("DEFAULT_CONTEXT", "Context used when none is supplied", "I'm just browsing the web."),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<29} {}\n", var, description));
            help.push_str(&format!("  {:<29} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n\n");

        help.push_str("Example .env file:\n\n");
        help.push_str(&Self::create_example_env_content());

        help
    }

    /// Check a .env file's entries without loading them
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                // The key is allowed to be blank in a template
                if key.trim() == "GEMINI_API_KEY" && value.trim().is_empty() {
                    continue;
                }
                if let Err(e) = Self::validate_env_var(key.trim(), value.trim()) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}
