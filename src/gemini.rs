//! Client for the Gemini text-generation REST endpoint.
//!
//! Owns transport, status translation, the single transparent retry, and
//! the deterministic output scrubbing. Callers only ever see
//! [`BackendError`] and clean narrative text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dialogue::{BackendError, Dialogue, DialogueRequest};
use crate::{docent, sanitize};

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        match body.text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(BackendError::EmptyResponse),
        }
    }
}

/// Connection-level failures get one transparent retry. A response that
/// arrived but could not be used never does; the caller decides.
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

#[async_trait]
impl Dialogue for GeminiClient {
    async fn converse(&self, request: &DialogueRequest<'_>) -> Result<String, BackendError> {
        let prompt = docent::build_prompt(request);

        let raw = match self.generate_once(&prompt).await {
            Ok(text) => text,
            Err(BackendError::Transport(ref error)) if is_transient(error) => {
                warn!("transient backend failure, retrying once: {error}");
                self.generate_once(&prompt).await?
            }
            Err(error) => return Err(error),
        };

        Ok(sanitize::scrub_reply(&raw, request.lang))
    }
}
