//! Failure classification into the closed error taxonomy
//!
//! Every error raised by a pipeline stage ends up here and is turned into a
//! [`TestResult::Failure`] with a fixed message template per kind and the
//! captured diagnostics needed to reproduce the fault.

use super::{exit_code_label, AppError};
use crate::models::{FailureDiagnostics, TestResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure kinds visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The measurement tool exceeded its deadline
    #[serde(rename = "TimeoutError")]
    Timeout,
    /// The measurement tool exited non-zero
    #[serde(rename = "ProcessError")]
    Process,
    /// No structured line in the tool output
    #[serde(rename = "ExtractionError")]
    Extraction,
    /// The structured line was malformed
    #[serde(rename = "ParseError")]
    Parse,
    /// Anything else
    #[serde(rename = "UnknownError")]
    Unknown,
}

impl ErrorKind {
    /// All kinds, in taxonomy order
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Timeout,
        ErrorKind::Process,
        ErrorKind::Extraction,
        ErrorKind::Parse,
        ErrorKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "TimeoutError",
            Self::Process => "ProcessError",
            Self::Extraction => "ExtractionError",
            Self::Parse => "ParseError",
            Self::Unknown => "UnknownError",
        }
    }

    /// HTTP status a boundary layer should answer with
    pub fn http_status(&self) -> u16 {
        500
    }

    /// Only a timed-out measurement is worth retrying as-is
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Process exit code used by the command-line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Timeout => 3,
            Self::Process => 6,
            Self::Extraction => 7,
            Self::Parse => 8,
            Self::Unknown => 99,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps internal errors to terminal failure results
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Convert an error into a `TestResult::Failure`
    pub fn classify(error: &AppError) -> TestResult {
        TestResult::Failure {
            kind: error.kind(),
            message: Self::message_for(error),
            diagnostics: Self::diagnostics_for(error),
        }
    }

    /// Deterministic user-facing message for an error
    pub fn message_for(error: &AppError) -> String {
        match error {
            AppError::Timeout { timeout, .. } => format!(
                "The speed test did not complete within {} seconds. Please try again.",
                timeout.as_secs()
            ),
            AppError::Process { code, stdout, stderr } => format!(
                "Critical speed test failure. Check the installation of the measurement tool. \
                 Exit code: {}. STDOUT: {}. STDERR: {}",
                exit_code_label(code),
                stdout.trim(),
                stderr.trim()
            ),
            AppError::Extraction { stdout, stderr } => format!(
                "Could not locate a structured result in the measurement tool output. \
                 STDOUT: {}. STDERR: {}",
                stdout.trim(),
                stderr.trim()
            ),
            AppError::Parse { cause, raw_line } => format!(
                "Failed to decode the measurement result: {}. Received: {}",
                cause, raw_line
            ),
            other => format!("An unexpected error occurred: {}", other),
        }
    }

    /// Captured output attached to a failure, verbatim
    pub fn diagnostics_for(error: &AppError) -> Option<FailureDiagnostics> {
        match error {
            AppError::Process { code, stdout, stderr } => Some(FailureDiagnostics {
                exit_code: *code,
                stdout: Some(stdout.clone()),
                stderr: Some(stderr.clone()),
                raw_line: None,
            }),
            AppError::Extraction { stdout, stderr } => Some(FailureDiagnostics {
                exit_code: Some(0),
                stdout: Some(stdout.clone()),
                stderr: Some(stderr.clone()),
                raw_line: None,
            }),
            AppError::Parse { raw_line, .. } => Some(FailureDiagnostics {
                raw_line: Some(raw_line.clone()),
                ..FailureDiagnostics::default()
            }),
            _ => None,
        }
    }
}
