//! Multi-turn flow handlers.
//!
//! Each flow owns the conversation for one intent: it extracts what it
//! can from the initial transcript, asks for the rest with bounded
//! retries, and produces an [`Outcome`] for the session loop.

pub mod email;
pub mod fallback;
pub mod files;
pub mod history;
pub mod study;

/// What the session loop should do after a flow completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Speak this reply and record the turn in memory.
    Spoken(String),
    /// A shutdown was requested; run the yes/no confirmation exchange.
    ConfirmShutdown,
    /// A farewell was spoken; end the session loop.
    Exit(String),
}

impl Outcome {
    /// The spoken text, for assertions and memory.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Spoken(text) | Self::Exit(text) => Some(text),
            Self::ConfirmShutdown => None,
        }
    }
}
