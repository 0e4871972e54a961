//! Configuration validation utilities and rules

use crate::{config::EnvManager, error::Result, models::Config};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Deadline above which a warning is raised, in seconds
const LONG_TIMEOUT_SECS: u64 = 120;
/// Deadline below which most speed tests cannot finish, in seconds
const SHORT_TIMEOUT_SECS: u64 = 10;

/// Configuration validator with advisory rules on top of [`Config::validate`]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the hard checks, then collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_command(&config.command));
        warnings.extend(Self::validate_timeouts(config));
        warnings.extend(Self::validate_analysis_endpoint(&config.gemini_base_url));
        warnings.extend(Self::validate_concurrency(config.max_concurrent, num_cpus::get()));
        warnings.extend(Self::validate_env_file(Path::new(".env")));

        Ok(warnings)
    }

    fn validate_command(command: &str) -> Vec<ValidationWarning> {
        if find_executable(command).is_some() {
            return Vec::new();
        }

        vec![ValidationWarning::new(
            ValidationLevel::Warning,
            format!(
                "Measurement tool '{}' was not found; every measurement will fail until it is installed",
                command
            ),
        )]
    }

    fn validate_timeouts(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout_seconds > LONG_TIMEOUT_SECS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Measurement timeout of {}s will hold a measurement slot for a long time",
                    config.timeout_seconds
                ),
            ));
        } else if config.timeout_seconds < SHORT_TIMEOUT_SECS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Measurement timeout of {}s may be too short for a full speed test",
                    config.timeout_seconds
                ),
            ));
        }

        if config.analysis_timeout_seconds < SHORT_TIMEOUT_SECS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Analysis timeout of {}s may be too short for report generation",
                    config.analysis_timeout_seconds
                ),
            ));
        }

        warnings
    }

    fn validate_analysis_endpoint(base_url: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Ok(parsed) = url::Url::parse(base_url) {
            if parsed.scheme() == "http" {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Analysis base URL '{}' uses HTTP; the API key will be sent unencrypted", base_url),
                ));
            }
        }

        warnings
    }

    fn validate_concurrency(max_concurrent: usize, cpu_cores: usize) -> Vec<ValidationWarning> {
        if max_concurrent <= cpu_cores {
            return Vec::new();
        }

        vec![ValidationWarning::new(
            ValidationLevel::Info,
            format!(
                "{} concurrent measurements exceed the {} available CPU cores; results may interfere",
                max_concurrent, cpu_cores
            ),
        )]
    }

    /// Report `.env` entries that would be rejected if the process environment did not override them
    pub fn validate_env_file(path: &Path) -> Vec<ValidationWarning> {
        match EnvManager::check_env_file(path) {
            Ok(Some(problems)) => problems
                .into_iter()
                .map(|problem| ValidationWarning::new(ValidationLevel::Warning, format!("{}: {}", path.display(), problem)))
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => vec![ValidationWarning::new(ValidationLevel::Warning, e.to_string())],
        }
    }
}

/// Resolve a program the way the OS would, searching PATH for bare names
pub fn find_executable(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(command))
        .find(|path| path.is_file())
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            let tag = match self.level {
                ValidationLevel::Info => tag.blue(),
                ValidationLevel::Warning => tag.yellow(),
            };
            format!("{} {}", tag, self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
