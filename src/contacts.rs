//! Contact book with voice-assisted address capture.
//!
//! Looking up an unknown name turns into a short voice exchange: the
//! assistant asks for the address, normalizes spoken forms (" at " → `@`,
//! " dot " → `.`), validates, and persists it for next time.

use crate::error::{AssistantError, Result};
use crate::speech::{SpeechInput, SpeechOutput};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Convert a spoken email ("john at example dot com") to address form.
#[must_use]
pub fn normalize_spoken_email(text: &str) -> String {
    text.to_lowercase()
        .replace(" at ", "@")
        .replace(" dot ", ".")
        .replace(' ', "")
}

/// True when `email` looks like a deliverable address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// File-backed name → email map. Names are stored lower-cased.
pub struct ContactBook {
    path: PathBuf,
    contacts: BTreeMap<String, String>,
}

impl ContactBook {
    /// Load contacts from `path`, starting empty if missing/unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let contacts = std::fs::read_to_string(path)
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            contacts,
        }
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&self.contacts)
            .map_err(|e| AssistantError::Contact(format!("failed to serialize contacts: {e}")))?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    /// Stored address for `name`, if known.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&String> {
        self.contacts.get(&name.to_lowercase())
    }

    /// Store an address for `name`.
    pub fn insert(&mut self, name: &str, email: &str) -> Result<()> {
        self.contacts
            .insert(name.to_lowercase().trim().to_owned(), email.to_owned());
        self.persist()
    }

    /// Find an address, asking the user by voice when unknown.
    ///
    /// A newly captured address is validated and persisted; an
    /// ununderstandable answer yields `None` (the flow reports failure).
    pub fn find_email(
        &mut self,
        name: &str,
        input: &mut dyn SpeechInput,
        output: &dyn SpeechOutput,
    ) -> Option<String> {
        if let Some(email) = self.get(name) {
            let email = email.clone();
            output.speak(&format!("Found {name}'s email: {email}"));
            return Some(email);
        }

        output.speak(&format!(
            "I don't have an email for {name}. What is their email address? Please say it clearly."
        ));
        let heard = input.listen_for_command()?;
        let email = normalize_spoken_email(&heard);
        if is_valid_email(&email) {
            if let Err(e) = self.insert(name, &email) {
                tracing::warn!("failed to persist contact: {e}");
            }
            info!(name, "contact saved");
            output.speak(&format!("Saved {name}'s email. Now I'll remember it."));
            Some(email)
        } else {
            output.speak("I couldn't understand the email address. Let's try again later.");
            None
        }
    }

    /// Spoken listing of all contacts.
    #[must_use]
    pub fn list(&self) -> String {
        if self.contacts.is_empty() {
            return "No contacts saved yet.".to_owned();
        }
        let mut lines = vec!["Saved contacts:".to_owned()];
        for (name, email) in &self.contacts {
            lines.push(format!("{name}: {email}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::test_utils::ScriptedSpeech;

    #[test]
    fn spoken_email_normalization() {
        assert_eq!(
            normalize_spoken_email("John at example dot com"),
            "john@example.com"
        );
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a.b@example.co"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn known_contact_is_returned_without_listening() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ContactBook::load(&dir.path().join("contacts.json"));
        book.insert("Alice", "alice@example.com").unwrap();

        let mut speech = ScriptedSpeech::with_commands(&[]);
        let out = speech.output();
        let email = book.find_email("alice", &mut speech, &*out);
        assert_eq!(email.as_deref(), Some("alice@example.com"));
        assert_eq!(speech.listen_calls(), 0);
    }

    #[test]
    fn unknown_contact_is_captured_by_voice_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        {
            let mut book = ContactBook::load(&path);
            let mut speech = ScriptedSpeech::with_commands(&["bob at example dot org"]);
            let out = speech.output();
            let email = book.find_email("Bob", &mut speech, &*out);
            assert_eq!(email.as_deref(), Some("bob@example.org"));
            assert!(out.said("Saved Bob's email"));
        }
        let book = ContactBook::load(&path);
        assert_eq!(book.get("bob").map(String::as_str), Some("bob@example.org"));
    }

    #[test]
    fn invalid_spoken_address_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ContactBook::load(&dir.path().join("contacts.json"));
        let mut speech = ScriptedSpeech::with_commands(&["mumble mumble"]);
        let out = speech.output();
        assert!(book.find_email("Carol", &mut speech, &*out).is_none());
        assert!(out.said("couldn't understand the email address"));
    }

    #[test]
    fn listing_contacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ContactBook::load(&dir.path().join("contacts.json"));
        assert_eq!(book.list(), "No contacts saved yet.");
        book.insert("alice", "alice@example.com").unwrap();
        assert!(book.list().contains("alice: alice@example.com"));
    }
}
