use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use serde_json::Value as Json;
use thiserror::Error;
use tracing::debug;

use sseaudit_core::TextGenerator;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Error, Debug)]
pub enum GeminiError {
    /// The reqwest error is the source; `{:#}` prints its chain once.
    #[error("request to Gemini failed")]
    Http(#[from] reqwest::Error),
    #[error("Gemini returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Gemini returned no text{}", finish_suffix(.reason))]
    Empty { reason: Option<String> },
}

fn finish_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(" (finish reason {r})")).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part { pub text: String }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest { pub contents: Vec<Content> }

impl GenerateRequest {
    pub fn user_prompt(prompt: &str) -> Self {
        let part = Part { text: prompt.to_string() };
        Self { contents: vec![Content { role: Some("user".into()), parts: vec![part] }] }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(rename="finishReason", default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    pub fn text(&self) -> Result<String, GeminiError> {
        let first = self.candidates.first();
        let text: String = first
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GeminiError::Empty { reason: first.and_then(|c| c.finish_reason.clone()) });
        }
        Ok(text)
    }
}

/// Pulls `error.message` out of a Google API error body, falling back to the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Json>(body).ok()
        .and_then(|v| v.pointer("/error/message").and_then(Json::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn generate_content(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, GeminiError> {
        debug!(model = %self.model, "requesting Gemini analysis");
        let resp = self.http.post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest::user_prompt(prompt))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            // an unreadable or empty body still yields a message
            let message = match resp.text().await {
                Ok(body) if !body.trim().is_empty() => error_message(&body),
                _ => status.canonical_reason().unwrap_or("no response body").to_string(),
            };
            return Err(GeminiError::Status { status: status.as_u16(), message });
        }
        resp.json::<GenerateResponse>().await?.text()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> anyhow::Result<String> {
        Ok(self.generate_content(api_key, prompt).await?)
    }
}
