//! Network Speed Reporter
//!
//! Runs an external speed-test tool under a hard deadline, pulls the single
//! structured result out of its noisy standard output, normalizes the raw
//! numbers into display values and asks an analysis service for a written
//! report about the connection.

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use app::App;
pub use error::{AppError, ErrorClassifier, ErrorKind, Result};
pub use models::{
    AnalysisContext, ApiResponse, Config, Invocation, NormalizedMetrics, ProcessOutcome,
    RawMetrics, TestResult,
};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_COMMAND: &str = "speedtest";
    pub const DEFAULT_COMMAND_ARGS: &[&str] = &["--json"];
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_CONTEXT: &str = "I'm just browsing the web.";
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Upper bound for the measurement deadline, in seconds
    pub const MAX_TIMEOUT_SECS: u64 = 600;
    /// Upper bound for the analysis request timeout, in seconds
    pub const MAX_ANALYSIS_TIMEOUT_SECS: u64 = 300;
    /// Upper bound for simultaneous measurements
    pub const MAX_CONCURRENT_LIMIT: usize = 64;
}
