//! Configuration types for the assistant.
//!
//! Everything lives in one TOML file (default `~/.sable/config.toml`).
//! Secrets (API keys, SMTP password) are read from environment variables
//! first, with the config file as fallback, so the file can be shared
//! without leaking credentials.

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Session loop settings (wake word, persona).
    pub session: SessionConfig,
    /// Dialogue retry settings.
    pub dialogue: DialogueConfig,
    /// Reminder store and checker settings.
    pub reminders: ReminderConfig,
    /// Study planner settings.
    pub planner: PlannerConfig,
    /// File content search settings.
    pub files: FileSearchConfig,
    /// Outgoing email (SMTP) settings.
    pub email: EmailConfig,
    /// External API settings (weather, holidays, generative model).
    pub api: ApiConfig,
    /// Data directory settings.
    pub storage: StorageConfig,
}

/// Session loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wake word/phrase that starts a command exchange.
    pub wake_word: String,
    /// Assistant persona name used in small-talk responses.
    pub persona: String,
    /// Default city for weather when none is spoken.
    pub home_city: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_word: "sable".to_owned(),
            persona: "Sable".to_owned(),
            home_city: "Chennai".to_owned(),
        }
    }
}

/// Dialogue controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Default number of listen attempts before a flow gives up.
    pub max_retries: u32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Seconds between due-reminder checks in the background task.
    pub check_interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 20,
        }
    }
}

/// Study planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Study hours available per day when building a schedule.
    pub available_hours_per_day: f32,
    /// Upper bound on scheduled days (long plans are truncated).
    pub max_schedule_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            available_hours_per_day: 4.0,
            max_schedule_days: 30,
        }
    }
}

/// File content search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    /// Directories to search. Empty means the user's home directory.
    pub roots: Vec<PathBuf>,
    /// Directory names skipped during traversal.
    pub skip_dirs: Vec<String>,
    /// Maximum number of results kept per search.
    pub max_results: usize,
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            skip_dirs: vec![
                ".git".to_owned(),
                "node_modules".to_owned(),
                "__pycache__".to_owned(),
                ".cache".to_owned(),
                "Library".to_owned(),
                "target".to_owned(),
            ],
            max_results: 200,
        }
    }
}

/// Outgoing email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_server: String,
    /// SMTP port (STARTTLS).
    pub smtp_port: u16,
    /// Sender address. Overridden by `SABLE_SENDER_EMAIL`.
    pub sender_email: String,
    /// Sender password/app token. Overridden by `SABLE_SENDER_PASSWORD`.
    pub sender_password: String,
    /// Name used to sign template emails.
    pub sender_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_owned(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
            sender_name: "User".to_owned(),
        }
    }
}

/// External HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// OpenWeather API key. Overridden by `OPENWEATHER_API_KEY`.
    pub weather_api_key: String,
    /// Calendarific API key. Overridden by `CALENDARIFIC_API_KEY`.
    pub holiday_api_key: String,
    /// ISO country code for holiday lookups.
    pub holiday_country: String,
    /// Generative model API key. Overridden by `GEMINI_API_KEY`.
    pub model_api_key: String,
    /// Generative model endpoint URL.
    pub model_endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            weather_api_key: String::new(),
            holiday_api_key: String::new(),
            holiday_country: "IN".to_owned(),
            model_api_key: String::new(),
            model_endpoint:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
                    .to_owned(),
        }
    }
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root data directory. `None` means `~/.sable`.
    pub root_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root_dir: None }
    }
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config: Self = toml::from_str(&body)
            .map_err(|e| AssistantError::Config(format!("invalid config: {e}")))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default configuration with env-var secrets applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OPENWEATHER_API_KEY") {
            self.api.weather_api_key = v;
        }
        if let Ok(v) = std::env::var("CALENDARIFIC_API_KEY") {
            self.api.holiday_api_key = v;
        }
        if let Ok(v) = std::env::var("GEMINI_API_KEY") {
            self.api.model_api_key = v;
        }
        if let Ok(v) = std::env::var("SABLE_SENDER_EMAIL") {
            self.email.sender_email = v;
        }
        if let Ok(v) = std::env::var("SABLE_SENDER_PASSWORD") {
            self.email.sender_password = v;
        }
    }

    /// Resolve the data directory, defaulting to `~/.sable`.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref root) = self.storage.root_dir {
            return root.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sable")
    }

    /// Path to the conversation memory file.
    #[must_use]
    pub fn memory_path(&self) -> PathBuf {
        self.data_dir().join("memory.json")
    }

    /// Path to the reminders file.
    #[must_use]
    pub fn reminders_path(&self) -> PathBuf {
        self.data_dir().join("reminders.json")
    }

    /// Path to the contact book file.
    #[must_use]
    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir().join("contacts.json")
    }

    /// Path to the study plan file.
    #[must_use]
    pub fn study_plan_path(&self) -> PathBuf {
        self.data_dir().join("study_plan.json")
    }

    /// Path to the music library file.
    #[must_use]
    pub fn music_library_path(&self) -> PathBuf {
        self.data_dir().join("music.json")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AssistantConfig::default();
        assert_eq!(config.dialogue.max_retries, 3);
        assert_eq!(config.reminders.check_interval_secs, 20);
        assert_eq!(config.session.home_city, "Chennai");
        assert!((config.planner.available_hours_per_day - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AssistantConfig = toml::from_str(
            r#"
            [session]
            wake_word = "friday"

            [reminders]
            check_interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.session.wake_word, "friday");
        assert_eq!(config.reminders.check_interval_secs, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.dialogue.max_retries, 3);
        assert_eq!(config.email.smtp_port, 587);
    }

    #[test]
    fn data_dir_override() {
        let mut config = AssistantConfig::default();
        config.storage.root_dir = Some(PathBuf::from("/tmp/sable-test"));
        assert_eq!(config.memory_path(), PathBuf::from("/tmp/sable-test/memory.json"));
    }
}
