//! Reminders: parsing, storage, and the background checker.
//!
//! The store is shared between the session loop (add/list/clear) and the
//! background checker task, so every read-modify-write happens under one
//! mutex and the file is rewritten before the lock is released. A due
//! reminder is removed in the same critical section that observes it,
//! which is what guarantees it fires exactly once.
//!
//! Absolute times must be spoken in 12-hour form with AM/PM. A 24-hour
//! time is rejected with a specific correction sentence instead of being
//! guessed at.

use crate::error::{AssistantError, Result};
use crate::speech::SpeechOutput;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A pending reminder. `time` is an ISO 8601 local timestamp; entries
/// whose timestamp no longer parses are pruned by the checker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    /// What to remind the user to do.
    pub task: String,
    /// When to fire, ISO 8601.
    pub time: String,
}

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"remind me to (.+?) in (\d+)\s*(minute|minutes|hour|hours)\b")
        .expect("valid relative reminder regex")
});

static ABSOLUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"remind me to (.+?) at (.+)").expect("valid absolute reminder regex"));

static AMPM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(1[0-2]|0?[1-9])(?::([0-5]\d))?\s*(am|pm)\b").expect("valid am/pm regex")
});

static TWENTY_FOUR_HOUR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(1[3-9]|2[0-3]|[01]?\d:[0-5]\d)\b").expect("valid 24-hour detector regex")
});

static OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+(\d+)\s*(minute|minutes|hour|hours)\b").expect("valid offset regex")
});

/// Parse a spoken time phrase relative to `now`.
///
/// Accepts `in N minutes|hours` and 12-hour clock times with AM/PM. An
/// absolute time at or before `now` rolls forward to the next day.
#[must_use]
pub fn parse_time(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let text = text.trim().to_lowercase();

    if let Some(caps) = OFFSET_RE.captures(&text) {
        let num: i64 = caps.get(1)?.as_str().parse().ok()?;
        let offset = if caps.get(2)?.as_str().starts_with("hour") {
            Duration::hours(num)
        } else {
            Duration::minutes(num)
        };
        return Some(now + offset);
    }

    if let Some(caps) = AMPM_RE.captures(&text) {
        let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps
            .get(2)
            .map_or(Some(0), |m| m.as_str().parse().ok())?;
        let meridian = caps.get(3)?.as_str().to_lowercase();
        if meridian == "pm" && hour != 12 {
            hour += 12;
        } else if meridian == "am" && hour == 12 {
            hour = 0;
        }
        let naive = now.date_naive().and_hms_opt(hour, minute, 0)?;
        let mut when = Local.from_local_datetime(&naive).earliest()?;
        if when <= now {
            when += Duration::days(1);
        }
        return Some(when);
    }

    None
}

/// Mutex-guarded, file-backed reminder store.
pub struct ReminderStore {
    path: PathBuf,
    reminders: Mutex<Vec<Reminder>>,
}

impl ReminderStore {
    /// Load the store from `path`, starting empty if missing/unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let reminders = std::fs::read_to_string(path)
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            reminders: Mutex::new(reminders),
        }
    }

    fn persist_locked(&self, reminders: &[Reminder]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(reminders)
            .map_err(|e| AssistantError::Reminder(format!("failed to serialize reminders: {e}")))?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Reminder>> {
        // A poisoned lock means a panicking test thread; the data is
        // still usable.
        self.reminders
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Parse a full `remind me …` command and store the reminder.
    ///
    /// Returns the spoken confirmation or a specific correction sentence.
    pub fn add_from_text(&self, text: &str) -> String {
        self.add_from_text_at(text, Local::now())
    }

    /// Like [`Self::add_from_text`] with an injectable clock for tests.
    pub fn add_from_text_at(&self, text: &str, now: DateTime<Local>) -> String {
        let lower = text.to_lowercase();

        if let Some(caps) = RELATIVE_RE.captures(&lower) {
            let task = caps[1].trim().to_owned();
            let phrase = format!("in {} {}", &caps[2], &caps[3]);
            let Some(when) = parse_time(&phrase, now) else {
                return "I couldn't understand the time for the reminder.".to_owned();
            };
            return self.store_reminder(task, when);
        }

        if let Some(caps) = ABSOLUTE_RE.captures(&lower) {
            let task = caps[1].trim().to_owned();
            let time_text = caps[2].trim();

            let Some(when) = parse_time(time_text, now) else {
                if TWENTY_FOUR_HOUR_RE.is_match(time_text) {
                    return "Please give time in 12-hour format (e.g. '10:30 PM') or say \
                            'in 10 minutes'. I don't accept 24-hour times like 21:30."
                        .to_owned();
                }
                return "I couldn't understand the time. Please say something like \
                        'at 9 PM' or 'in 10 minutes'."
                    .to_owned();
            };
            return self.store_reminder(task, when);
        }

        "I couldn't understand the reminder command.".to_owned()
    }

    fn store_reminder(&self, task: String, when: DateTime<Local>) -> String {
        let rendered = when.format("%I:%M %p").to_string();
        let mut reminders = self.lock();
        reminders.push(Reminder {
            task: task.clone(),
            time: when.naive_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
        });
        if let Err(e) = self.persist_locked(&reminders) {
            warn!("failed to persist reminders: {e}");
        }
        info!(task, time = %when, "reminder stored");
        format!("Reminder set for '{task}' at {rendered}")
    }

    /// Spoken listing of pending reminders.
    #[must_use]
    pub fn list_text(&self) -> String {
        let reminders = self.lock();
        if reminders.is_empty() {
            return "You have no reminders set.".to_owned();
        }
        let lines: Vec<String> = reminders
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let rendered = NaiveDateTime::parse_from_str(&r.time, "%Y-%m-%dT%H:%M:%S")
                    .map_or_else(|_| r.time.clone(), |dt| dt.format("%I:%M %p").to_string());
                format!("{}. {} at {}", i + 1, r.task, rendered)
            })
            .collect();
        lines.join("\n")
    }

    /// Remove all reminders.
    #[must_use]
    pub fn clear_all(&self) -> String {
        let mut reminders = self.lock();
        reminders.clear();
        if let Err(e) = self.persist_locked(&reminders) {
            warn!("failed to persist reminders: {e}");
        }
        "All reminders cleared.".to_owned()
    }

    /// Number of pending reminders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no reminders are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every reminder due at `now`, pruning entries
    /// whose timestamp no longer parses. One critical section covers the
    /// check, the removal, and the file write, so a reminder observed
    /// here can never be observed again.
    pub fn take_due(&self, now: DateTime<Local>) -> Vec<Reminder> {
        let mut reminders = self.lock();
        let mut due = Vec::new();
        let mut changed = false;

        reminders.retain(|r| {
            match NaiveDateTime::parse_from_str(&r.time, "%Y-%m-%dT%H:%M:%S") {
                Ok(dt) => {
                    if now.naive_local() >= dt {
                        due.push(r.clone());
                        changed = true;
                        false
                    } else {
                        true
                    }
                }
                Err(_) => {
                    warn!(time = %r.time, "dropping reminder with unparseable time");
                    changed = true;
                    false
                }
            }
        });

        if changed {
            if let Err(e) = self.persist_locked(&reminders) {
                warn!("failed to persist reminders: {e}");
            }
        }
        due
    }
}

/// Spawn the background checker task.
///
/// Polls every `interval_secs`, speaking each due reminder. Stops when
/// `cancel` fires.
pub fn spawn_checker(
    store: Arc<ReminderStore>,
    speech: Arc<dyn SpeechOutput>,
    interval_secs: u64,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("reminder checker stopping");
                    break;
                }
                _ = ticker.tick() => {
                    for reminder in store.take_due(Local::now()) {
                        info!(task = %reminder.task, "reminder fired");
                        speech.speak(&format!("Hi, it's time to {}", reminder.task));
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::Timelike;

    fn temp_store() -> (tempfile::TempDir, ReminderStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ReminderStore::load(&dir.path().join("reminders.json"));
        (dir, store)
    }

    #[test]
    fn relative_reminder_scenario() {
        let (_dir, store) = temp_store();
        let now = Local::now();
        let reply = store.add_from_text_at("remind me to call mom in 10 minutes", now);
        assert!(reply.contains("call mom"), "confirmation names the task: {reply}");
        // Confirmation carries a 12-hour clock rendering.
        assert!(reply.contains("AM") || reply.contains("PM"), "12-hour render: {reply}");

        let stored = store.lock()[0].clone();
        let dt = NaiveDateTime::parse_from_str(&stored.time, "%Y-%m-%dT%H:%M:%S").unwrap();
        let delta = dt - now.naive_local();
        assert!(
            (delta - Duration::minutes(10)).num_seconds().abs() <= 1,
            "time is ~now+10min, got delta {delta}"
        );
    }

    #[test]
    fn twenty_four_hour_time_is_rejected() {
        let (_dir, store) = temp_store();
        let reply = store.add_from_text("remind me to leave at 21:30");
        assert!(reply.contains("12-hour format"), "rejection sentence: {reply}");
        assert!(store.is_empty(), "no reminder stored");
    }

    #[test]
    fn past_absolute_time_rolls_to_next_day() {
        let now = Local::now().with_nanosecond(0).unwrap();
        // One hour ago, expressed as a 12-hour time.
        let earlier = now - Duration::hours(1);
        let phrase = earlier.format("%I:%M %p").to_string().to_lowercase();
        let parsed = parse_time(&format!("at {phrase}"), now).unwrap();
        assert!(parsed > now);
        assert_eq!(parsed.time().hour(), earlier.time().hour());
    }

    #[test]
    fn noon_and_midnight_edge_cases() {
        let now = Local
            .from_local_datetime(
                &chrono::NaiveDate::from_ymd_opt(2026, 3, 2)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
            )
            .unwrap();
        let noon = parse_time("12 pm", now).unwrap();
        assert_eq!(noon.time().hour(), 12);
        let midnight = parse_time("12 am", now).unwrap();
        // 12 AM today is before 8 AM, so it rolls to tomorrow.
        assert_eq!(midnight.time().hour(), 0);
        assert!(midnight > now);
    }

    #[test]
    fn gibberish_command_is_reported() {
        let (_dir, store) = temp_store();
        let reply = store.add_from_text("remind me of nothing in particular");
        assert_eq!(reply, "I couldn't understand the reminder command.");
    }

    #[test]
    fn due_reminder_fires_exactly_once() {
        let (_dir, store) = temp_store();
        let now = Local::now();
        store.add_from_text_at("remind me to stretch in 1 minutes", now);

        let later = now + Duration::minutes(5);
        let first = store.take_due(later);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].task, "stretch");
        // Second sweep must see nothing.
        assert!(store.take_due(later).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_time_entries_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        std::fs::write(
            &path,
            r#"[{"task":"ok","time":"2999-01-01T00:00:00"},{"task":"bad","time":"not-a-time"}]"#,
        )
        .unwrap();
        let store = ReminderStore::load(&path);
        assert_eq!(store.len(), 2);
        let due = store.take_due(Local::now());
        assert!(due.is_empty(), "future reminder not due, corrupt one dropped silently");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_renders_12_hour_clock() {
        let (_dir, store) = temp_store();
        store.add_from_text("remind me to hydrate in 2 hours");
        let listing = store.list_text();
        assert!(listing.starts_with("1. hydrate at "));
        assert!(listing.contains("AM") || listing.contains("PM"));
    }

    #[test]
    fn clear_all_empties_store() {
        let (_dir, store) = temp_store();
        store.add_from_text("remind me to stand up in 5 minutes");
        assert_eq!(store.clear_all(), "All reminders cleared.");
        assert!(store.is_empty());
    }
}
