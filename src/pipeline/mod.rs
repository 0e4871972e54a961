//! Output-normalization pipeline
//!
//! Stages run strictly in order on the captured tool output:
//! [`OutputExtractor`] → [`MetricParser`] → [`MetricNormalizer`] → [`ResultAssembler`].

pub mod assembler;
pub mod extractor;
pub mod normalizer;
pub mod parser;

pub use assembler::ResultAssembler;
pub use extractor::OutputExtractor;
pub use normalizer::{MetricNormalizer, PING_CEILING_MS, PING_ERROR, UNAVAILABLE};
pub use parser::MetricParser;

use crate::error::Result;
use crate::models::{NormalizedMetrics, ProcessOutcome, RawMetrics};

/// Extract, parse and normalize in one step
pub fn normalize_outcome(outcome: &ProcessOutcome) -> Result<(RawMetrics, NormalizedMetrics)> {
    let line = OutputExtractor::extract(&outcome.stdout, &outcome.stderr)?;
    let raw = MetricParser::parse(&line)?;
    Ok((raw, MetricNormalizer::normalize(&raw)))
}
