//! Holiday lookup via Calendarific.

use crate::config::ApiConfig;
use chrono::{Datelike, Local};
use serde_json::Value;
use tracing::warn;

/// Answers "is today special?".
pub trait HolidayProvider: Send {
    /// Spoken sentence describing today's holidays, if any.
    fn today(&self) -> String;
}

/// Calendarific REST client.
pub struct Calendarific {
    api_key: String,
    country: String,
    base_url: String,
    agent: ureq::Agent,
}

impl Calendarific {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            api_key: config.holiday_api_key.clone(),
            country: config.holiday_country.clone(),
            base_url: "https://calendarific.com/api/v2/holidays".to_owned(),
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(10))
                .build(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }
}

impl HolidayProvider for Calendarific {
    fn today(&self) -> String {
        if self.api_key.is_empty() {
            return "Holiday API key not set. Please set the CALENDARIFIC_API_KEY environment \
                    variable."
                .to_owned();
        }

        let now = Local::now();
        let response = self
            .agent
            .get(&self.base_url)
            .query("api_key", &self.api_key)
            .query("country", &self.country)
            .query("year", &now.year().to_string())
            .query("month", &now.month().to_string())
            .query("day", &now.day().to_string())
            .call();

        let raw = match response {
            Ok(response) => match response.into_string() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("holiday response unreadable: {e}");
                    return "There are no important days today.".to_owned();
                }
            },
            Err(e) => {
                warn!("holiday lookup failed: {e}");
                return "There are no important days today.".to_owned();
            }
        };
        let Ok(body) = serde_json::from_str::<Value>(&raw) else {
            return "There are no important days today.".to_owned();
        };

        let names: Vec<&str> = body["response"]["holidays"]
            .as_array()
            .map(|holidays| {
                holidays
                    .iter()
                    .filter_map(|h| h["name"].as_str())
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() {
            "There are no important days today.".to_owned()
        } else {
            format!("Today is special: {}", names.join(", "))
        }
    }
}
