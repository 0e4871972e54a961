//! Measurement tool execution
//!
//! This module contains the process-facing side of a measurement:
//! - [`CommandExecutor`], the capability that actually starts a program
//! - [`SystemCommandExecutor`], a tokio subprocess implementation with a hard deadline
//! - [`ProcessRunner`], which turns timeouts and non-zero exits into errors
//! - [`MeasurementGate`], the admission limit in front of the runner

pub mod gate;
pub mod system;

pub use gate::{MeasurementGate, SystemResources};
pub use system::SystemCommandExecutor;

use crate::{
    error::{AppError, Result},
    models::{Invocation, ProcessOutcome},
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Starts an external program and captures everything it prints
///
/// Implementations return `Ok` for any process that was started, including
/// ones that exited non-zero or were killed at the deadline. `Err` is reserved
/// for failures to start or wait on the process at all.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str, args: &[String], timeout: Duration) -> Result<ProcessOutcome>;
}

/// Runs the measurement tool and enforces the exit-status contract
#[derive(Clone)]
pub struct ProcessRunner {
    executor: Arc<dyn CommandExecutor>,
}

impl ProcessRunner {
    /// Create a runner on top of any executor
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Create a runner that spawns real subprocesses
    pub fn system() -> Self {
        Self::new(Arc::new(SystemCommandExecutor::new()))
    }

    /// Run the invocation and return its output only if it exited with status zero
    pub async fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome> {
        let outcome = self
            .executor
            .execute(&invocation.command, &invocation.args, invocation.timeout)
            .await?;

        if outcome.timed_out {
            return Err(AppError::timeout(invocation.command.clone(), invocation.timeout));
        }

        if outcome.exit_code != Some(0) {
            return Err(AppError::process(outcome.exit_code, outcome.stdout, outcome.stderr));
        }

        Ok(outcome)
    }
}
