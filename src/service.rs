//! HTTP boundary: one POST route per ritual operation.
//!
//! The handlers are stateless; each request carries the session snapshot
//! and a controller is rebuilt around it, so independent sessions never
//! share mutable state.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_macros::debug_handler;
use tracing::{error, info};

use crate::arcana;
use crate::dialogue::Mode;
use crate::elicitation::{ElicitationTarget, Elicitor, Phase, TurnError};
use crate::gemini::GeminiClient;
use crate::image_prompt;
use crate::imagen::ImagenClient;
use crate::models::{
    ChatRequest, ChatResponse, ErrorResponse, GenerateRequest, GenerateResponse, ResolveRequest,
    ResolveResponse,
};
use crate::rate_limiter::RateLimiter;
use crate::sanitize;
use crate::transcript::Transcript;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<GeminiClient>,
    pub imagen: Arc<ImagenClient>,
    pub generate_gate: Arc<RateLimiter>,
    pub transcript: Option<Arc<Transcript>>,
    pub target: ElicitationTarget,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/resolve", post(handle_resolve))
        .route("/chat", post(handle_chat))
        .route("/generate", post(handle_generate))
        .with_state(state)
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::message(message)),
    )
}

async fn handle_resolve(
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    match arcana::life_path(&request.birthdate) {
        Ok(card) => Ok(Json(ResolveResponse { card })),
        Err(e) => Err(bad_request(e.to_string())),
    }
}

#[debug_handler]
async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(card) = arcana::card_by_id(request.card) else {
        return Err(bad_request(format!("unknown card id {}", request.card)));
    };
    let label = sanitize::sanitize_label(request.user_name.as_deref(), request.lang);

    match request.mode {
        Mode::Reveal => {
            let mut session = Elicitor::new(card, state.target, label, request.lang);
            let narrative = session.reveal(state.backend.as_ref()).await.map_err(|e| {
                error!("reveal turn failed: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse::message(e.to_string())),
                )
            })?;

            if let Some(transcript) = &state.transcript {
                transcript.log_reveal(card.name);
            }
            Ok(Json(ChatResponse {
                reply: narrative,
                collected: session.collected().clone(),
                phase: Phase::Reveal,
                image_prompt: None,
            }))
        }

        Mode::Workshop => {
            // No utterance means a retry of a turn whose input was already
            // captured into the collected snapshot.
            let retrying = request.user_utterance.is_none();
            if retrying
                && request.collected.objects.is_empty()
                && request.collected.colors.is_empty()
            {
                return Err(bad_request("a workshop turn requires a user utterance"));
            }

            let mut session = Elicitor::resume(
                card,
                state.target,
                label,
                request.lang,
                request.collected,
                request.history,
                retrying,
            );

            if let Some(utterance) = request.user_utterance.as_deref() {
                match session.capture(utterance) {
                    Ok(slot) => {
                        if let Some(transcript) = &state.transcript {
                            transcript.log_capture(&format!("{slot:?}"), utterance);
                        }
                    }
                    Err(TurnError::SessionComplete) => {
                        return Err((
                            StatusCode::CONFLICT,
                            Json(ErrorResponse {
                                error: TurnError::SessionComplete.to_string(),
                                collected: Some(session.collected().clone()),
                                phase: Some(session.phase()),
                            }),
                        ));
                    }
                    Err(e) => return Err(bad_request(e.to_string())),
                }
            }

            match session.exchange(state.backend.as_ref()).await {
                Ok(reply) => {
                    let image_prompt = (session.phase() == Phase::Complete)
                        .then(|| image_prompt::compile(session.card(), session.collected()));
                    if let (Some(transcript), Some(prompt)) = (&state.transcript, &image_prompt) {
                        transcript.log_complete(prompt);
                    }
                    Ok(Json(ChatResponse {
                        reply,
                        collected: session.collected().clone(),
                        phase: session.phase(),
                        image_prompt,
                    }))
                }
                Err(e) => {
                    error!("workshop turn failed: {e}");
                    if let Some(transcript) = &state.transcript {
                        transcript.log_error(&e.to_string());
                    }
                    // The utterance is already captured; hand the snapshot
                    // back so the client can retry without re-asking.
                    Err((
                        StatusCode::BAD_GATEWAY,
                        Json(ErrorResponse {
                            error: e.to_string(),
                            collected: Some(session.collected().clone()),
                            phase: Some(session.phase()),
                        }),
                    ))
                }
            }
        }
    }
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if let Err(remaining) = state.generate_gate.check_and_update() {
        info!(
            "generation cooldown active, {}s remaining",
            remaining.as_secs() + 1
        );
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::message(format!(
                "generation cooling down, retry in {}s",
                remaining.as_secs() + 1
            ))),
        ));
    }

    match state.imagen.generate(&request.prompt).await {
        Ok(image) => {
            if let Some(transcript) = &state.transcript {
                transcript.log_generate(&request.prompt);
            }
            Ok(Json(GenerateResponse { image }))
        }
        Err(e) => {
            error!("image generation failed: {e}");
            if let Some(transcript) = &state.transcript {
                transcript.log_error(&e.to_string());
            }
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::message(e.to_string())),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_returns_the_card_for_a_valid_date() {
        let response = handle_resolve(Json(ResolveRequest {
            birthdate: "19900101".into(),
        }))
        .await
        .unwrap();
        assert_eq!(response.0.card.id, 21);
    }

    #[tokio::test]
    async fn resolve_rejects_a_malformed_date() {
        let err = handle_resolve(Json(ResolveRequest {
            birthdate: "1990011".into(),
        }))
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
