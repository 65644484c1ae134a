use serde::{Deserialize, Serialize};

use crate::arcana::ArcanaCard;
use crate::dialogue::{Lang, Mode, Turn};
use crate::elicitation::{Collected, Phase};

// Resolve endpoint

#[derive(Deserialize)]
pub struct ResolveRequest {
    pub birthdate: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub card: &'static ArcanaCard,
}

// Chat endpoint

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub mode: Mode,
    /// Card id previously returned by /resolve; the registry is looked up
    /// server-side.
    pub card: u8,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub lang: Lang,
    /// Absent on reveal turns, and absent on a retry of a turn whose
    /// utterance was already captured into `collected`.
    #[serde(default)]
    pub user_utterance: Option<String>,
    #[serde(default)]
    pub collected: Collected,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub collected: Collected,
    pub phase: Phase,
    /// Compiled image prompt, present once the session is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

// Generate endpoint

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub image: String,
}

// Error body shared by every endpoint. Chat failures carry the captured
// state back so the client never loses elicited items.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected: Option<Collected>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            collected: None,
            phase: None,
        }
    }
}
