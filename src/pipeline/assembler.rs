//! Building the analysis request and the final success result

use crate::analysis::prompt::build_prompt;
use crate::models::{AnalysisContext, AnalysisRequest, NormalizedMetrics, TestResult};

/// Combines metrics, caller context and analysis text
pub struct ResultAssembler;

impl ResultAssembler {
    /// Build the payload for the analysis service
    pub fn assemble(metrics: NormalizedMetrics, context: AnalysisContext) -> AnalysisRequest {
        let prompt = build_prompt(&metrics, &context);
        AnalysisRequest {
            metrics,
            context,
            prompt,
        }
    }

    /// Wrap the request and the service's answer into a success result
    pub fn finalize(request: AnalysisRequest, analysis: String) -> TestResult {
        TestResult::Success {
            metrics: request.metrics,
            context: request.context,
            analysis,
        }
    }
}
