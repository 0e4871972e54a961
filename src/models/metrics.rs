//! Raw and normalized measurement metrics

use serde::{Deserialize, Serialize};

/// Numbers as reported by the measurement tool
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Download throughput in bits per second
    pub download: f64,
    /// Upload throughput in bits per second
    pub upload: f64,
    /// Round-trip latency in milliseconds
    pub ping: f64,
}

impl RawMetrics {
    pub fn new(download: f64, upload: f64, ping: f64) -> Self {
        Self { download, upload, ping }
    }
}

/// Display-ready metrics; every field is text, never a raw number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    /// e.g. `"50.0 Mbit/s"` or `"Unavailable"`
    pub download: String,
    /// e.g. `"10.0 Mbit/s"`
    pub upload: String,
    /// e.g. `"20 ms"` or `"Error/Too high"`
    pub ping: String,
}
