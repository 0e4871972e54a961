//! JSON response shape handed to a request/response boundary

use crate::models::TestResult;
use serde::{Deserialize, Serialize};

/// Metrics and context as reported to the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    pub download: String,
    pub upload: String,
    pub ping: String,
    pub context: String,
}

/// `{success, data, analysis}` on success, `{success, message}` on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    /// HTTP status matching a result
    pub fn status_for(result: &TestResult) -> u16 {
        match result {
            TestResult::Success { .. } => 200,
            TestResult::Failure { kind, .. } => kind.http_status(),
        }
    }
}

impl From<&TestResult> for ApiResponse {
    fn from(result: &TestResult) -> Self {
        match result {
            TestResult::Success { metrics, context, analysis } => Self {
                success: true,
                data: Some(ResponseData {
                    download: metrics.download.clone(),
                    upload: metrics.upload.clone(),
                    ping: metrics.ping.clone(),
                    context: context.as_str().to_string(),
                }),
                analysis: Some(analysis.clone()),
                message: None,
            },
            TestResult::Failure { message, .. } => Self {
                success: false,
                data: None,
                analysis: None,
                message: Some(message.clone()),
            },
        }
    }
}
