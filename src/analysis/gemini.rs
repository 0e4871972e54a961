//! Gemini `generateContent` client

use crate::analysis::AnalysisClient;
use crate::models::Config;
use crate::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// HTTP client for the Gemini generative language API
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from the loaded configuration
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::config("GEMINI_API_KEY is not set"))?;

        Self::with_settings(
            api_key,
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            config.analysis_timeout(),
        )
    }

    /// Build a client from explicit settings
    pub fn with_settings(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::analysis(format!("Failed to create analysis client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full endpoint URL for the configured model
    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn extract_text(response: GenerateResponse) -> Result<String> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return Err(AppError::analysis(format!("Prompt was blocked: {}", reason)));
        }

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::analysis("Analysis service returned no text"));
        }

        Ok(text)
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::analysis(format!("Analysis request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::analysis(format!(
                "Analysis service rejected the API key: HTTP {}",
                status
            )));
        }

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::analysis(format!(
                "Analysis service returned HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::analysis(format!("Failed to parse analysis response: {}", e)))?;

        Self::extract_text(parsed)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
