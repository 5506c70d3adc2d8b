//! Generative-model fallback for commands no rule matches.

use crate::config::ApiConfig;
use crate::memory::Turn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// How many recent turns of history travel with each query.
const HISTORY_TURNS: usize = 20;
/// Response cap, in model tokens.
const MAX_OUTPUT_TOKENS: u32 = 200;

/// A conversational model the fallback flow can query.
pub trait GenerativeModel: Send {
    /// Answer a prompt given recent conversation history. Failures come
    /// back as sentences starting with a recognizable sentinel so the
    /// caller can fall through to other sources.
    fn query(&self, prompt: &str, history: &[Turn]) -> String;
}

/// Returns true for the sentinel sentences a failed query produces.
#[must_use]
pub fn is_model_failure(reply: &str) -> bool {
    reply.starts_with("Gemini API error")
        || reply.starts_with("Gemini did not return")
        || reply.starts_with("Gemini API key not set")
}

/// Gemini REST client.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    agent: ureq::Agent,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.model_endpoint.clone(),
            api_key: config.model_api_key.clone(),
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(20))
                .build(),
        }
    }

    fn build_contents(prompt: &str, history: &[Turn]) -> Value {
        let mut contents = Vec::new();
        let start = history.len().saturating_sub(HISTORY_TURNS);
        for turn in &history[start..] {
            contents.push(json!({"role": "user", "parts": [{"text": turn.q}]}));
            contents.push(json!({"role": "model", "parts": [{"text": turn.a}]}));
        }
        contents.push(json!({"role": "user", "parts": [{"text": prompt}]}));
        Value::Array(contents)
    }
}

impl GenerativeModel for GeminiClient {
    fn query(&self, prompt: &str, history: &[Turn]) -> String {
        if self.api_key.is_empty() {
            return "Gemini API key not set. Please set the GEMINI_API_KEY environment variable."
                .to_owned();
        }

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let payload = json!({
            "contents": Self::build_contents(prompt, history),
            "generationConfig": {"maxOutputTokens": MAX_OUTPUT_TOKENS},
        });
        debug!(prompt, "querying model");

        let response = match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&payload.to_string())
        {
            Ok(response) => response,
            Err(e) => {
                warn!("model request failed: {e}");
                return format!("Gemini API error: {e}");
            }
        };

        let raw = match response.into_string() {
            Ok(raw) => raw,
            Err(e) => return format!("Gemini API error: {e}"),
        };
        let body: Value = match serde_json::from_str(&raw) {
            Ok(body) => body,
            Err(e) => return format!("Gemini API error: {e}"),
        };

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map_or_else(
                || "Gemini did not return a valid response.".to_owned(),
                |text| clean_markdown(text),
            )
    }
}

static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*|__(.*?)__").expect("valid bold regex"));
static EMPHASIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.*?)\*|_(.*?)_").expect("valid emphasis regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid link regex"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:\d+\.|[-*+])\s+").expect("valid list marker regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// Flatten model markdown into something a voice can read aloud.
#[must_use]
pub fn clean_markdown(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1$2");
    let text = EMPHASIS_RE.replace_all(&text, "$1$2");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = LIST_MARKER_RE.replace_all(&text, "");
    let text = text.replace('\n', " ");
    SPACE_RE.replace_all(&text, " ").trim().to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn markdown_is_flattened_for_speech() {
        let raw = "**Rust** is a _systems_ language.\n1. fast\n2. safe\nSee [docs](https://example.com).";
        assert_eq!(
            clean_markdown(raw),
            "Rust is a systems language. fast safe See docs."
        );
    }

    #[test]
    fn failure_sentinels_are_recognized() {
        assert!(is_model_failure("Gemini API error: timeout"));
        assert!(is_model_failure("Gemini did not return a valid response."));
        assert!(is_model_failure(
            "Gemini API key not set. Please set the GEMINI_API_KEY environment variable."
        ));
        assert!(!is_model_failure("Rust is a systems language."));
    }

    #[test]
    fn missing_key_short_circuits() {
        let client = GeminiClient::new(&ApiConfig::default());
        let reply = client.query("hello", &[]);
        assert!(is_model_failure(&reply));
    }

    #[test]
    fn history_is_capped_and_ordered() {
        let history: Vec<Turn> = (0..30)
            .map(|i| Turn {
                q: format!("q{i}"),
                a: format!("a{i}"),
            })
            .collect();
        let contents = GeminiClient::build_contents("now", &history);
        let arr = contents.as_array().unwrap();
        // 20 turns, two entries each, plus the prompt.
        assert_eq!(arr.len(), 41);
        assert_eq!(arr[0]["parts"][0]["text"], "q10");
        assert_eq!(arr[40]["parts"][0]["text"], "now");
    }
}
