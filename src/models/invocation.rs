//! Measurement tool invocation and captured process outcome

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One request to run the measurement tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Program name or path
    pub command: String,
    /// Argument list, passed without shell interpretation
    pub args: Vec<String>,
    /// Hard wall-clock deadline
    pub timeout: Duration,
}

impl Invocation {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.command)
        } else {
            write!(f, "{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Everything captured from one run of the measurement tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Exit code, `None` when the process was killed or died on a signal
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Whether the deadline fired before the process exited
    pub timed_out: bool,
    /// Wall-clock time spent waiting for the process
    pub elapsed: Duration,
}

impl ProcessOutcome {
    /// Outcome of a process that exited on its own
    pub fn completed(exit_code: Option<i32>, stdout: String, stderr: String, elapsed: Duration) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            timed_out: false,
            elapsed,
        }
    }

    /// Outcome of a process killed at the deadline; no output is kept
    pub fn timed_out(elapsed: Duration) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
            elapsed,
        }
    }

    /// Check if the process exited with status zero
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}
