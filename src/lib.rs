//! vitrail — a tarot-styled conversational content generator.
//!
//! A birthdate reduces to one of 22 Major Arcana identities; a two-phase
//! scripted dialogue with a text-generation backend elicits a fixed number
//! of symbolic objects and colors; the finished set compiles into a
//! stained-glass image prompt. The elicitation state machine lives in
//! [`elicitation`]; everything remote sits behind [`dialogue`] and
//! [`imagen`].

pub mod advisory;
pub mod arcana;
pub mod config;
pub mod dialogue;
pub mod docent;
pub mod elicitation;
pub mod gemini;
pub mod image_prompt;
pub mod imagen;
pub mod models;
pub mod rate_limiter;
pub mod sanitize;
pub mod service;
pub mod transcript;
