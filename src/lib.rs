//! Sable: a voice-driven personal assistant.
//!
//! This crate provides a wake-word command loop built from small,
//! replaceable collaborators:
//! Wake word → transcript → intent router → flow handler → spoken reply
//!
//! # Architecture
//!
//! - **Routing**: An ordered substring/regex rule table maps each
//!   transcript to exactly one intent; first match wins
//! - **Slot extraction**: Per-kind pattern tables pull typed values
//!   (city, date, recipient, keyword, song) out of raw transcripts
//! - **Dialogue**: Missing slots are collected by voice with bounded,
//!   context-specific retries
//! - **Flows**: Multi-turn handlers for study plans, email, file
//!   search, and history clearing
//! - **Collaborators**: File-backed memory, reminders, contacts, and
//!   planner stores, plus HTTP providers for weather, holidays, and a
//!   generative-model fallback

pub mod config;
pub mod contacts;
pub mod dialogue;
pub mod email;
pub mod error;
pub mod extract;
pub mod files;
pub mod flows;
pub mod holidays;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod music;
pub mod planner;
pub mod reminders;
pub mod session;
pub mod speech;
pub mod system;
pub mod weather;
pub mod websearch;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use flows::Outcome;
pub use intent::{route, Intent, RouteContext};
pub use session::{Assistant, SessionState};
pub use speech::{ConsoleSpeech, SpeechInput, SpeechOutput};
