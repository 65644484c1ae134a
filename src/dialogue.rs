//! The dialogue-backend seam.
//!
//! The elicitation controller talks to the text-generation service only
//! through the [`Dialogue`] trait, so the remote client is constructed once
//! and injected rather than reached through module-level state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::arcana::ArcanaCard;
use crate::elicitation::{Collected, ElicitationTarget};

/// Which phase of the ritual this turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Reveal,
    Workshop,
}

/// Session language. The docent speaks Korean by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ko,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    System,
    User,
}

/// One line of conversation, kept only to rebuild backend requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
        }
    }
}

/// Everything the backend needs to compose one turn.
///
/// `collected` and `history` are empty for reveal turns.
#[derive(Debug, Clone)]
pub struct DialogueRequest<'a> {
    pub mode: Mode,
    pub card: &'static ArcanaCard,
    pub user_label: &'a str,
    pub lang: Lang,
    pub target: ElicitationTarget,
    pub collected: &'a Collected,
    pub history: &'a [Turn],
}

/// Failures crossing the backend boundary.
///
/// Transport failures may be retried once by the adapter; an empty or
/// unusable body is a hard failure so the caller can fall back to asking
/// the user to resubmit.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend returned an empty or unusable response")]
    EmptyResponse,
}

#[async_trait]
pub trait Dialogue: Send + Sync {
    /// Send one phase-tagged turn and return the raw narrative text.
    async fn converse(&self, request: &DialogueRequest<'_>) -> Result<String, BackendError>;
}
