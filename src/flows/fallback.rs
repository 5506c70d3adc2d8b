//! Catch-all flow: model first, encyclopedia second, a search link last.

use crate::llm::{is_model_failure, GenerativeModel};
use crate::memory::ConversationMemory;
use crate::websearch;
use tracing::debug;

/// Answer an arbitrary question.
pub fn answer(text: &str, model: &dyn GenerativeModel, memory: &ConversationMemory) -> String {
    let reply = model.query(text, &memory.recent_turns(20));
    if !is_model_failure(&reply) {
        return reply;
    }
    debug!("model unavailable, trying encyclopedia");

    let summary = websearch::wikipedia_summary(text);
    if !summary.starts_with("Sorry, I couldn't find") {
        return summary;
    }

    format!(
        "Could not find an answer. You can search online: https://www.google.com/search?q={}",
        urlencoding::encode(text)
    )
}
