//! Configuration data model and validation

use crate::error::{AppError, Result};
use crate::models::Invocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Main application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Measurement tool program name or path
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments passed to the measurement tool
    #[serde(default = "default_command_args")]
    pub command_args: Vec<String>,

    /// Hard deadline for one measurement
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Maximum number of measurements allowed to run at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Credential for the analysis service
    #[serde(default, skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// Analysis model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Analysis service base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// HTTP timeout for analysis requests
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_seconds: u64,

    /// Context used when the caller supplies none
    #[serde(default = "default_context")]
    pub default_context: String,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Print the boundary JSON response instead of the text report
    #[serde(default)]
    pub json_output: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: default_command(),
            command_args: default_command_args(),
            timeout_seconds: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            analysis_timeout_seconds: default_analysis_timeout_secs(),
            default_context: default_context(),
            enable_color: default_enable_color(),
            json_output: false,
            verbose: false,
            debug: false,
        }
    }
}

// Hand-written so the API key never reaches logs or debug output
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("command", &self.command)
            .field("command_args", &self.command_args)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_concurrent", &self.max_concurrent)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("analysis_timeout_seconds", &self.analysis_timeout_seconds)
            .field("default_context", &self.default_context)
            .field("enable_color", &self.enable_color)
            .field("json_output", &self.json_output)
            .field("verbose", &self.verbose)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the measurement deadline as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Get the analysis request timeout as Duration
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_seconds)
    }

    /// Build the invocation for one measurement request
    pub fn invocation(&self) -> Invocation {
        Invocation::new(self.command.clone(), self.command_args.clone(), self.timeout())
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(AppError::config("Measurement command cannot be empty"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > crate::defaults::MAX_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                crate::defaults::MAX_TIMEOUT_SECS
            )));
        }

        if self.max_concurrent == 0 {
            return Err(AppError::config("Concurrent measurement limit must be greater than 0"));
        }

        if self.max_concurrent > crate::defaults::MAX_CONCURRENT_LIMIT {
            return Err(AppError::config(format!(
                "Concurrent measurement limit cannot exceed {}",
                crate::defaults::MAX_CONCURRENT_LIMIT
            )));
        }

        if self.gemini_model.trim().is_empty() {
            return Err(AppError::config("Analysis model cannot be empty"));
        }

        match url::Url::parse(&self.gemini_base_url) {
            Ok(parsed) => {
                if parsed.scheme() != "https" && parsed.scheme() != "http" {
                    return Err(AppError::config(format!(
                        "Analysis base URL must use HTTP(S): {}",
                        self.gemini_base_url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid analysis base URL '{}': {}",
                    self.gemini_base_url, e
                )));
            }
        }

        if self.analysis_timeout_seconds == 0 {
            return Err(AppError::config("Analysis timeout must be greater than 0"));
        }

        if self.analysis_timeout_seconds > crate::defaults::MAX_ANALYSIS_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Analysis timeout cannot exceed {} seconds",
                crate::defaults::MAX_ANALYSIS_TIMEOUT_SECS
            )));
        }

        if self.default_context.trim().is_empty() {
            return Err(AppError::config("Default context cannot be empty"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(command) = std::env::var("SPEEDTEST_COMMAND") {
            self.command = command.trim().to_string();
        }

        if let Ok(args) = std::env::var("SPEEDTEST_ARGS") {
            self.command_args = args.split_whitespace().map(String::from).collect();
        }

        if let Ok(timeout) = std::env::var("MEASUREMENT_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MEASUREMENT_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(limit) = std::env::var("MAX_CONCURRENT_MEASUREMENTS") {
            self.max_concurrent = limit.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_CONCURRENT_MEASUREMENTS value '{}': {}", limit, e)))?;
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            let key = key.trim();
            self.gemini_api_key = if key.is_empty() { None } else { Some(key.to_string()) };
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.gemini_model = model.trim().to_string();
        }

        if let Ok(base_url) = std::env::var("GEMINI_API_BASE_URL") {
            self.gemini_base_url = base_url.trim().trim_end_matches('/').to_string();
        }

        if let Ok(timeout) = std::env::var("ANALYSIS_TIMEOUT_SECONDS") {
            self.analysis_timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ANALYSIS_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(context) = std::env::var("DEFAULT_CONTEXT") {
            if !context.trim().is_empty() {
                self.default_context = context;
            }
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_command() -> String {
    crate::defaults::DEFAULT_COMMAND.to_string()
}

fn default_command_args() -> Vec<String> {
    crate::defaults::DEFAULT_COMMAND_ARGS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_max_concurrent() -> usize {
    crate::executor::SystemResources::detect().recommended_concurrency
}

fn default_gemini_model() -> String {
    crate::defaults::DEFAULT_GEMINI_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    crate::defaults::DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_analysis_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_ANALYSIS_TIMEOUT.as_secs()
}

fn default_context() -> String {
    crate::defaults::DEFAULT_CONTEXT.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
