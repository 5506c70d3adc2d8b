//! Greetings, date/time answers, and machine shutdown.

use chrono::{DateTime, Duration, Local, Timelike};
use tracing::{info, warn};

/// Time-of-day greeting.
#[must_use]
pub fn greeting(now: DateTime<Local>) -> String {
    match now.hour() {
        5..=11 => "Hello, Good morning!".to_owned(),
        12..=15 => "Hello, Good afternoon!".to_owned(),
        16..=21 => "Hello, Good evening!".to_owned(),
        _ => "Hello, it's quite late!".to_owned(),
    }
}

/// Answer a date/time question.
///
/// Understands "tomorrow" for date questions; a command naming neither
/// "time" nor "date" gets both. "day after tomorrow" still hits the
/// "tomorrow" substring check first, so it shifts by one day, not two.
/// That is long-standing observable behavior.
#[must_use]
pub fn date_time_reply(command: &str, now: DateTime<Local>) -> String {
    let command = command.to_lowercase();

    let target_date = if command.contains("tomorrow") {
        now + Duration::days(1)
    } else if command.contains("day after tomorrow") {
        now + Duration::days(2)
    } else {
        now
    };

    let wants_time = command.contains("time");
    let wants_date = command.contains("date");

    if wants_time && !wants_date {
        format!("The time is {}", now.format("%I:%M %p"))
    } else if wants_date && !wants_time {
        format!("The date is {}", target_date.format("%A, %d %B %Y"))
    } else {
        format!(
            "Today is {} and the time is {}",
            target_date.format("%A, %d %B %Y"),
            now.format("%I:%M %p")
        )
    }
}

/// The question asked before any shutdown proceeds.
pub const SHUTDOWN_CONFIRM_PROMPT: &str =
    "Are you sure you want to shut down the computer? Please say yes or no.";

/// Powers the machine off.
///
/// A trait so the session can be tested without side effects.
pub trait SystemControl: Send {
    /// Begin shutdown; the returned sentence is spoken first.
    fn shutdown(&self) -> String;
}

/// Real shutdown via the platform's own command.
pub struct HostSystem;

impl SystemControl for HostSystem {
    fn shutdown(&self) -> String {
        info!("shutdown requested");
        let result = if cfg!(target_os = "windows") {
            std::process::Command::new("shutdown")
                .args(["/s", "/t", "5"])
                .spawn()
        } else if cfg!(target_os = "macos") {
            std::process::Command::new("osascript")
                .args(["-e", "tell app \"System Events\" to shut down"])
                .spawn()
        } else {
            std::process::Command::new("shutdown")
                .args(["-h", "+0"])
                .spawn()
        };

        match result {
            Ok(_) => "Shutting down in 5 seconds!".to_owned(),
            Err(e) => {
                warn!("shutdown command failed: {e}");
                format!("Sorry, I couldn't shut down the computer: {e}")
            }
        }
    }
}
