//! Client for the Imagen image-generation REST endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("image API key is missing")]
    MissingApiKey,

    #[error("image transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("image backend returned no image payload")]
    NoImage,
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

pub struct ImagenClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl ImagenClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    /// Render one square image for the compiled prompt and return it as a
    /// `data:` URL the presentation layer can display directly.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let url = format!(
            "{}/v1beta/models/{}:predict?key={}",
            self.endpoint, self.model, self.api_key
        );
        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
            }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
            },
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
            if status.as_u16() == 429 {
                tracing::warn!("image backend rate limit: {message}");
            }
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: PredictResponse = response.json().await?;
        body.predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded)
            .filter(|b64| !b64.is_empty())
            .map(|b64| format!("data:image/png;base64,{b64}"))
            .ok_or(GenerationError::NoImage)
    }
}
