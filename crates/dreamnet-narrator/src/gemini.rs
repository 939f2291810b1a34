//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use dreamnet_core::error::DomainError;
use dreamnet_core::narrative::{NarrativeGenerationService, NarrativeRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default Generative Language API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";

/// Connection settings for [`GeminiNarrator`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Model name, e.g. `gemini-1.5-pro-latest`.
    pub model: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Transport-level timeout for one request.
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Narrative service backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiNarrator {
    client: Client,
    config: GeminiConfig,
}

impl GeminiNarrator {
    /// Creates a client for `config`.
    #[must_use]
    pub fn new(mut config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, DomainError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(DomainError::MalformedNarrative(
            "response carried no text".to_owned(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl NarrativeGenerationService for GeminiNarrator {
    async fn generate(&self, request: NarrativeRequest) -> Result<String, DomainError> {
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
        };

        debug!(purpose = ?request.purpose, model = %self.config.model, "Calling Gemini");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, purpose = ?request.purpose, "Gemini rejected the request");
            return Err(DomainError::ServiceUnavailable(format!(
                "Gemini returned {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| DomainError::MalformedNarrative(format!("Gemini response: {e}")))?;
        response_text(parsed)
    }
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> DomainError {
    if error.is_timeout() {
        DomainError::Timeout(timeout)
    } else {
        // Strip the URL so the API key never reaches logs or clients.
        DomainError::ServiceUnavailable(format!(
            "Gemini request failed: {}",
            error.without_url()
        ))
    }
}
