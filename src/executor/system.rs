//! Subprocess executor backed by `tokio::process`

use crate::{
    error::{AppError, Result},
    executor::CommandExecutor,
    models::ProcessOutcome,
};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Spawns real processes, killing them if they outlive the deadline
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn execute(&self, command: &str, args: &[String], timeout: Duration) -> Result<ProcessOutcome> {
        let started = Instant::now();

        // kill_on_drop: dropping the wait future at the deadline kills the child
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::spawn(command, e.to_string()))?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ProcessOutcome::completed(
                output.status.code(),
                String::from_utf8_lossy(&output.stdout).into_owned(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
                started.elapsed(),
            )),
            Ok(Err(e)) => Err(AppError::io(format!("Failed waiting for '{}': {}", command, e))),
            Err(_) => Ok(ProcessOutcome::timed_out(started.elapsed())),
        }
    }
}
