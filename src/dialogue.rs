//! Bounded-retry voice dialogue for collecting missing slots.
//!
//! A flow that needs a value it could not extract asks a question, then
//! listens up to `max_retries` times. Re-prompts are context-specific so
//! the user hears what kind of answer is expected, not a generic "what?".

use crate::speech::{SpeechInput, SpeechOutput};
use tracing::debug;

/// Identifies which re-prompt to use when a listen attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueContext {
    /// Exam date for a study plan.
    ExamDate,
    /// Subject name for a study plan.
    SubjectName,
    /// Email recipient name.
    EmailRecipient,
    /// Email subject line.
    EmailSubject,
    /// Email body text.
    EmailContent,
    /// Topic for a template email.
    EmailTopic,
    /// Numbered date choice when clearing history.
    MemoryChoice,
    /// Keyword for file content search.
    SearchKeyword,
    /// File number choice after a search.
    FileSelection,
    /// Yes/no shutdown confirmation.
    ShutdownConfirmation,
}

impl DialogueContext {
    /// Clarification line spoken before each retry.
    #[must_use]
    pub fn reprompt(self) -> &'static str {
        match self {
            Self::ExamDate => {
                "I didn't catch the exam date. Please say it again, like 'December 15 2025'."
            }
            Self::SubjectName => "I didn't catch the subject name. Please say it again.",
            Self::MemoryChoice => "I didn't catch which date to clear. Please say the number again.",
            Self::SearchKeyword => "What keyword should I search for?",
            Self::FileSelection => "Which file number should I open?",
            Self::ShutdownConfirmation => {
                "Please say 'yes' to shut down or 'no' to cancel."
            }
            // No specific wording recorded for these; fall back to generic.
            Self::EmailRecipient | Self::EmailSubject | Self::EmailContent | Self::EmailTopic => {
                "I didn't catch that. Please say it again."
            }
        }
    }
}

/// Transient retry-tracking state for one pending slot request.
#[derive(Debug, Clone, Default)]
pub struct DialogueSession {
    /// Whether a slot request is currently in progress.
    pub active: bool,
    /// Which re-prompt applies while active.
    pub context: Option<DialogueContext>,
    /// Listen attempts consumed so far.
    pub retry_count: u32,
    /// Total attempts allowed.
    pub max_retries: u32,
}

impl DialogueSession {
    /// Reset to inactive. Called on success, exhaustion, and at the start
    /// of every fresh top-level command.
    pub fn reset(&mut self) {
        self.active = false;
        self.context = None;
        self.retry_count = 0;
        self.max_retries = 0;
    }
}

/// Spoken when every retry is exhausted.
const GIVE_UP_LINE: &str = "I'm having trouble understanding. Let's go back to the main menu.";

/// Ask-and-listen with bounded retries.
///
/// Speaks `prompt` (if given) before the first attempt, then the context
/// re-prompt before each subsequent attempt. Returns the first nonempty
/// transcript, or `None` once `max_retries` attempts have failed. The
/// session is inactive when this returns, in either case.
pub fn ask(
    session: &mut DialogueSession,
    input: &mut dyn SpeechInput,
    output: &dyn SpeechOutput,
    context: DialogueContext,
    prompt: Option<&str>,
    max_retries: u32,
) -> Option<String> {
    session.active = true;
    session.context = Some(context);
    session.retry_count = 0;
    session.max_retries = max_retries;

    let mut attempt = 0;
    while attempt < max_retries {
        if attempt == 0 {
            if let Some(prompt) = prompt {
                output.speak(prompt);
            }
        } else {
            output.speak(context.reprompt());
        }

        if let Some(answer) = input.listen_for_command() {
            if !answer.trim().is_empty() {
                debug!(?context, attempt, "slot answer received");
                session.reset();
                return Some(answer);
            }
        }

        attempt += 1;
        session.retry_count = attempt;
    }

    debug!(?context, max_retries, "dialogue retries exhausted");
    session.reset();
    output.speak(GIVE_UP_LINE);
    None
}
