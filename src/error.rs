//! Error types for the assistant.

/// Top-level error type for the voice assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Conversation memory storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Reminder store error.
    #[error("reminder error: {0}")]
    Reminder(String),

    /// Study planner error.
    #[error("planner error: {0}")]
    Planner(String),

    /// Contact book error.
    #[error("contact error: {0}")]
    Contact(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
