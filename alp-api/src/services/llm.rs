//! Generative-AI text client
//!
//! [`TextGenerator`] is the seam between the services and the upstream model.
//! [`GeminiClient`] talks to the Gemini `generateContent` REST endpoint; tests
//! substitute a scripted implementation.

use alp_common::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("alp-api/", env!("CARGO_PKG_VERSION"));

/// Generative-AI client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI service is not configured (no API key)")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("AI response contained no text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Single-prompt text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier reported by health checks
    fn model(&self) -> &str;

    /// Whether an API key is available
    fn is_configured(&self) -> bool;

    /// Send one prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

// ============================================================================
// Gemini wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gemini `generateContent` client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    config: LlmConfig,
}

impl GeminiClient {
    /// Build a client; `api_key = None` yields a client that reports itself
    /// unconfigured and fails every call with [`LlmError::NotConfigured`]
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Calling generateContent"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();

        // Gemini reports a bad key as 400 API_KEY_INVALID or 401/403
        if status == 401 || status == 403 {
            return Err(LlmError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if error_text.contains("API_KEY_INVALID") {
                return Err(LlmError::InvalidApiKey);
            }
            return Err(LlmError::ApiError(status.as_u16(), error_text));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let text = body.into_text().ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(response_chars = text.len(), "generateContent succeeded");

        Ok(text)
    }
}
