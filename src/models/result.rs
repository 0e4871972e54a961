//! Analysis context, request payload and terminal test result

use crate::error::ErrorKind;
use crate::models::NormalizedMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-form caller text describing how the connection is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisContext(String);

impl AnalysisContext {
    /// Use the caller's text, or `fallback` when it is absent or blank
    pub fn new(supplied: Option<String>, fallback: &str) -> Self {
        match supplied {
            Some(text) if !text.trim().is_empty() => Self(text),
            _ => Self(fallback.to_string()),
        }
    }

    /// Context with the built-in fallback text
    pub fn from_caller(supplied: Option<String>) -> Self {
        Self::new(supplied, crate::defaults::DEFAULT_CONTEXT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload handed to the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub metrics: NormalizedMetrics,
    pub context: AnalysisContext,
    /// Prompt text embedding the metrics and context
    pub prompt: String,
}

/// Captured output kept on a failure so it can be reproduced
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FailureDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_line: Option<String>,
}

/// Outcome of one measurement request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestResult {
    Success {
        metrics: NormalizedMetrics,
        context: AnalysisContext,
        analysis: String,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        diagnostics: Option<FailureDiagnostics>,
    },
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            Self::Success { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message),
            Self::Success { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> Option<&FailureDiagnostics> {
        match self {
            Self::Failure { diagnostics, .. } => diagnostics.as_ref(),
            Self::Success { .. } => None,
        }
    }

    pub fn metrics(&self) -> Option<&NormalizedMetrics> {
        match self {
            Self::Success { metrics, .. } => Some(metrics),
            Self::Failure { .. } => None,
        }
    }

    /// Process exit code for the command-line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success { .. } => 0,
            Self::Failure { kind, .. } => kind.exit_code(),
        }
    }
}
