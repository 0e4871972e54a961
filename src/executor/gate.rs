//! Admission limit for concurrent measurements
//!
//! Every measurement spawns a process that saturates the network link, so the
//! number running at once is capped with a semaphore sized from the config.

use crate::error::{AppError, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// System resource information used for the default concurrency limit
#[derive(Debug, Clone)]
pub struct SystemResources {
    /// Number of logical CPU cores
    pub cpu_cores: usize,
    /// Default number of simultaneous measurements
    pub recommended_concurrency: usize,
}

impl SystemResources {
    /// Detect system resources and derive the default limit
    pub fn detect() -> Self {
        let cpu_cores = num_cpus::get();

        // Measurements compete for one network link; a few at a time is plenty
        let recommended_concurrency = (cpu_cores / 2).clamp(1, 4);

        Self {
            cpu_cores,
            recommended_concurrency,
        }
    }
}

/// Semaphore-backed gate in front of the process runner
#[derive(Debug, Clone)]
pub struct MeasurementGate {
    limiter: Arc<Semaphore>,
    capacity: usize,
}

impl MeasurementGate {
    /// Create a gate admitting up to `capacity` measurements (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            limiter: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a slot; the slot is released when the permit is dropped
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit> {
        self.limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::internal("Measurement gate is closed"))
    }

    /// Configured number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.limiter.available_permits()
    }
}
