//! Error handling for the network speed reporter

pub mod classifier;

pub use classifier::{ErrorClassifier, ErrorKind};

use std::time::Duration;
use thiserror::Error;

/// Custom error types for the network speed reporter
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The measurement tool ran past its deadline and was killed
    #[error("Timeout error: '{command}' did not finish within {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The measurement tool exited with a non-zero status
    #[error("Process error: measurement tool exited with code {}", exit_code_label(.code))]
    Process {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// No structured line was found in the tool output
    #[error("Extraction error: no structured result line in measurement output")]
    Extraction { stdout: String, stderr: String },

    /// The structured line could not be decoded
    #[error("Parsing error: {cause}")]
    Parse { cause: String, raw_line: String },

    /// The measurement tool could not be started at all
    #[error("Spawn error: failed to start '{command}': {reason}")]
    Spawn { command: String, reason: String },

    /// Analysis service errors
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Render an optional exit code, `None` meaning the process died on a signal
pub fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new measurement timeout error
    pub fn timeout<S: Into<String>>(command: S, timeout: Duration) -> Self {
        Self::Timeout {
            command: command.into(),
            timeout,
        }
    }

    /// Create a new process error, keeping the captured output
    pub fn process<S: Into<String>, T: Into<String>>(code: Option<i32>, stdout: S, stderr: T) -> Self {
        Self::Process {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a new extraction error, keeping the captured output
    pub fn extraction<S: Into<String>, T: Into<String>>(stdout: S, stderr: T) -> Self {
        Self::Extraction {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a new parsing error for a structured line
    pub fn parse<S: Into<String>, T: Into<String>>(cause: S, raw_line: T) -> Self {
        Self::Parse {
            cause: cause.into(),
            raw_line: raw_line.into(),
        }
    }

    /// Create a new spawn error
    pub fn spawn<S: Into<String>, T: Into<String>>(command: S, reason: T) -> Self {
        Self::Spawn {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create a new analysis error
    pub fn analysis<S: Into<String>>(message: S) -> Self {
        Self::Analysis(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Process { .. } => "PROCESS",
            Self::Extraction { .. } => "EXTRACT",
            Self::Parse { .. } => "PARSE",
            Self::Spawn { .. } => "SPAWN",
            Self::Analysis(_) => "ANALYSIS",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Map onto the closed failure taxonomy exposed to callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Process { .. } => ErrorKind::Process,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config(_)
            | Self::Spawn { .. }
            | Self::Analysis(_)
            | Self::Io(_)
            | Self::Internal(_) => ErrorKind::Unknown,
        }
    }

    /// Check if error is recoverable (caller can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Analysis(_) => true,
            Self::Config(_) | Self::Process { .. } | Self::Extraction { .. } | Self::Parse { .. } => false,
            Self::Spawn { .. } | Self::Io(_) | Self::Internal(_) => false,
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Analysis(_) => 2,
            Self::Spawn { .. } | Self::Io(_) => 5,
            Self::Internal(_) => 99,
            _ => self.kind().exit_code(),
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse { .. } => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Process { .. } | Self::Extraction { .. } | Self::Spawn { .. } => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout { .. } => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Analysis(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::config(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::analysis(format!("request timed out: {}", error))
        } else {
            Self::analysis(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::config(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::config(format!("Boolean parse error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for startup failures shown on the console
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error, with a retry hint for recoverable errors in verbose mode
    pub fn render(&self, error: &AppError) -> String {
        let mut rendered = error.format_for_console(self.use_color);

        if self.verbose && error.is_recoverable() {
            let hint = "This error might be temporary. You can try running the command again.";
            rendered.push('\n');
            if self.use_color {
                use colored::Colorize;
                rendered.push_str(&hint.green().to_string());
            } else {
                rendered.push_str(hint);
            }
        }

        rendered
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
