//! Decoding the structured result line

use crate::error::{AppError, Result};
use crate::models::RawMetrics;
use serde::Deserialize;

/// Fields read from the tool's JSON; everything else in the record is ignored
#[derive(Debug, Deserialize)]
struct WireMetrics {
    #[serde(default)]
    download: Option<f64>,
    #[serde(default)]
    upload: Option<f64>,
    #[serde(default)]
    ping: Option<f64>,
}

/// Turns the extracted line into raw numbers
pub struct MetricParser;

impl MetricParser {
    /// Decode `line`; absent or `null` fields become `0.0`
    pub fn parse(line: &str) -> Result<RawMetrics> {
        let wire: WireMetrics = serde_json::from_str(line)
            .map_err(|e| AppError::parse(e.to_string(), line))?;

        Ok(RawMetrics::new(
            wire.download.unwrap_or(0.0),
            wire.upload.unwrap_or(0.0),
            wire.ping.unwrap_or(0.0),
        ))
    }
}
