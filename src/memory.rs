//! Day-keyed conversation memory.
//!
//! One JSON file mapping ISO dates to ordered question/answer turns.
//! Kept deliberately small and inspectable; the generative-model fallback
//! reads the most recent turns from here for context.

use crate::error::{AssistantError, Result};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// One question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// What the user said.
    pub q: String,
    /// What the assistant answered.
    pub a: String,
}

/// What `clear` decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing stored; spoken as-is.
    Done(String),
    /// The caller must run a voice dialogue over these candidate dates.
    ChooseDate(Vec<String>),
}

/// File-backed conversation history, keyed by ISO date.
#[derive(Debug)]
pub struct ConversationMemory {
    path: PathBuf,
    history: BTreeMap<String, Vec<Turn>>,
}

impl ConversationMemory {
    /// Load memory from `path`, starting empty if the file is missing or
    /// unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let history = std::fs::read_to_string(path)
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            history,
        }
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&self.history)
            .map_err(|e| AssistantError::Memory(format!("failed to serialize history: {e}")))?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    /// Record one exchange under today's date.
    pub fn add_turn(&mut self, question: &str, answer: &str) -> Result<()> {
        let today = Local::now().date_naive().to_string();
        self.history.entry(today).or_default().push(Turn {
            q: question.to_owned(),
            a: answer.to_owned(),
        });
        self.persist()
    }

    /// The full history map (dates ascending).
    #[must_use]
    pub fn history(&self) -> &BTreeMap<String, Vec<Turn>> {
        &self.history
    }

    /// The most recent `limit` turns, flattened in chronological order.
    #[must_use]
    pub fn recent_turns(&self, limit: usize) -> Vec<Turn> {
        let mut turns: Vec<Turn> = self
            .history
            .values()
            .flat_map(|day| day.iter().cloned())
            .collect();
        if turns.len() > limit {
            turns.drain(..turns.len() - limit);
        }
        turns
    }

    /// Spoken listing of recorded questions, filtered by day.
    ///
    /// `day` is `"today"`, `"yesterday"`, or anything else for all days.
    #[must_use]
    pub fn list_history(&self, day: &str) -> String {
        if self.history.is_empty() {
            return "I don't have any history stored yet.".to_owned();
        }

        let today = Local::now().date_naive();
        let mut lines = Vec::new();
        let mut counter = 1;

        match day {
            "today" => {
                self.list_one_day(&today, "Today", &mut lines, &mut counter);
            }
            "yesterday" => {
                let yesterday = today - Duration::days(1);
                self.list_one_day(&yesterday, "Yesterday", &mut lines, &mut counter);
            }
            _ => {
                lines.push("All recorded history:".to_owned());
                for (date, turns) in &self.history {
                    lines.push(format!("\n{date}:"));
                    for turn in turns {
                        lines.push(format!("{counter}. {}", turn.q));
                        counter += 1;
                    }
                }
            }
        }

        lines.join("\n")
    }

    fn list_one_day(
        &self,
        date: &NaiveDate,
        label: &str,
        lines: &mut Vec<String>,
        counter: &mut usize,
    ) {
        let key = date.to_string();
        if let Some(turns) = self.history.get(&key) {
            lines.push(format!("{label}'s history:"));
            for turn in turns {
                lines.push(format!("{counter}. {}", turn.q));
                *counter += 1;
            }
        } else {
            lines.push(format!("No history recorded for {}.", label.to_lowercase()));
        }
    }

    /// Begin a clear operation for the given spoken command.
    ///
    /// `"delete history"` clears everything immediately; otherwise the
    /// stored dates are returned so the caller can ask which to clear.
    pub fn clear(&mut self, command: &str) -> Result<ClearOutcome> {
        if self.history.is_empty() {
            return Ok(ClearOutcome::Done("No memory to clear.".to_owned()));
        }

        if command.to_lowercase().contains("delete history") {
            self.history.clear();
            self.persist()?;
            info!("conversation history deleted");
            return Ok(ClearOutcome::Done(
                "Deleted all history successfully.".to_owned(),
            ));
        }

        Ok(ClearOutcome::ChooseDate(
            self.history.keys().cloned().collect(),
        ))
    }

    /// Clear one date. Clearing an absent date is a no-op and reports
    /// "not found".
    pub fn clear_date(&mut self, date: &str) -> Result<String> {
        if self.history.remove(date).is_some() {
            self.persist()?;
            info!(date, "cleared history for date");
            Ok(format!("Cleared memory for {date}."))
        } else {
            Ok("Date not found in memory.".to_owned())
        }
    }

    /// Clear every stored day.
    pub fn clear_all(&mut self) -> Result<String> {
        self.history.clear();
        self.persist()?;
        info!("cleared all history");
        Ok("Cleared all history successfully.".to_owned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn temp_memory() -> (tempfile::TempDir, ConversationMemory) {
        let dir = tempfile::tempdir().unwrap();
        let memory = ConversationMemory::load(&dir.path().join("memory.json"));
        (dir, memory)
    }

    #[test]
    fn add_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        {
            let mut memory = ConversationMemory::load(&path);
            memory.add_turn("what time is it", "The time is 10:00 AM").unwrap();
        }
        let memory = ConversationMemory::load(&path);
        assert_eq!(memory.recent_turns(20).len(), 1);
        assert_eq!(memory.recent_turns(20)[0].q, "what time is it");
    }

    #[test]
    fn recent_turns_caps_at_limit() {
        let (_dir, mut memory) = temp_memory();
        for i in 0..30 {
            memory.add_turn(&format!("q{i}"), &format!("a{i}")).unwrap();
        }
        let recent = memory.recent_turns(20);
        assert_eq!(recent.len(), 20);
        // Oldest turns are dropped, newest kept.
        assert_eq!(recent[0].q, "q10");
        assert_eq!(recent[19].q, "q29");
    }

    #[test]
    fn list_history_empty() {
        let (_dir, memory) = temp_memory();
        assert_eq!(memory.list_history("all"), "I don't have any history stored yet.");
    }

    #[test]
    fn list_history_today_filter() {
        let (_dir, mut memory) = temp_memory();
        memory.add_turn("hello", "hi").unwrap();
        let listing = memory.list_history("today");
        assert!(listing.starts_with("Today's history:"));
        assert!(listing.contains("1. hello"));
        // No turns yesterday.
        assert!(memory.list_history("yesterday").contains("No history recorded"));
    }

    #[test]
    fn clear_on_empty_reports_nothing_to_clear() {
        let (_dir, mut memory) = temp_memory();
        assert_eq!(
            memory.clear("clear history").unwrap(),
            ClearOutcome::Done("No memory to clear.".to_owned())
        );
    }

    #[test]
    fn clear_returns_candidate_dates() {
        let (_dir, mut memory) = temp_memory();
        memory.add_turn("q", "a").unwrap();
        match memory.clear("clear history").unwrap() {
            ClearOutcome::ChooseDate(dates) => assert_eq!(dates.len(), 1),
            other => panic!("expected date listing, got {other:?}"),
        }
    }

    #[test]
    fn delete_history_phrase_clears_immediately() {
        let (_dir, mut memory) = temp_memory();
        memory.add_turn("q", "a").unwrap();
        let outcome = memory.clear("delete history").unwrap();
        assert_eq!(outcome, ClearOutcome::Done("Deleted all history successfully.".to_owned()));
        assert!(memory.history().is_empty());
    }

    #[test]
    fn clearing_missing_date_is_idempotent() {
        let (_dir, mut memory) = temp_memory();
        memory.add_turn("q", "a").unwrap();
        let before = memory.history().clone();
        let result = memory.clear_date("1999-01-01").unwrap();
        assert_eq!(result, "Date not found in memory.");
        assert_eq!(memory.history(), &before);
    }
}
