//! Analysis service integration
//!
//! The service is opaque to the pipeline: it receives one prompt and answers
//! with an HTML fragment. Clients are constructed explicitly at startup and
//! passed into [`crate::App`].

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;
pub use prompt::build_prompt;

use crate::error::Result;
use async_trait::async_trait;

/// Text-generation capability used for the connection report
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Generate report text for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
