//! Data models and structures for the network speed reporter

pub mod config;
pub mod invocation;
pub mod metrics;
pub mod response;
pub mod result;

// Re-export main model types
pub use config::Config;
pub use invocation::{Invocation, ProcessOutcome};
pub use metrics::{NormalizedMetrics, RawMetrics};
pub use response::{ApiResponse, ResponseData};
pub use result::{AnalysisContext, AnalysisRequest, FailureDiagnostics, TestResult};
