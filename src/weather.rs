//! Current-conditions lookup via OpenWeather.

use crate::config::ApiConfig;
use serde_json::Value;
use tracing::warn;

/// Fetches spoken weather reports for a city.
pub trait WeatherProvider: Send {
    /// Report current conditions; the sentence is spoken verbatim.
    fn current(&self, city: &str) -> String;
}

/// OpenWeather REST client.
pub struct OpenWeather {
    api_key: String,
    base_url: String,
    agent: ureq::Agent,
}

impl OpenWeather {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            api_key: config.weather_api_key.clone(),
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_owned(),
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

impl WeatherProvider for OpenWeather {
    fn current(&self, city: &str) -> String {
        if self.api_key.is_empty() {
            return "Weather API key not set. Please set the OPENWEATHER_API_KEY environment \
                    variable."
                .to_owned();
        }

        let response = self
            .agent
            .get(&self.base_url)
            .query("q", city)
            .query("appid", &self.api_key)
            .query("units", "metric")
            .call();

        let raw = match response {
            Ok(response) => match response.into_string() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(city, "weather response unreadable: {e}");
                    return format!("Sorry, I couldn't find weather info for {city}.");
                }
            },
            Err(e) => {
                warn!(city, "weather lookup failed: {e}");
                return format!("Sorry, I couldn't find weather info for {city}.");
            }
        };
        let Ok(body) = serde_json::from_str::<Value>(&raw) else {
            return format!("Sorry, I couldn't find weather info for {city}.");
        };

        let description = body["weather"][0]["description"].as_str();
        let temp = body["main"]["temp"].as_f64();
        let feels_like = body["main"]["feels_like"].as_f64();

        match (description, temp, feels_like) {
            (Some(description), Some(temp), Some(feels_like)) => format!(
                "The weather in {city} is {description} with {temp}°C, \
                 feels like {feels_like}°C."
            ),
            _ => format!("Sorry, I couldn't find weather info for {city}."),
        }
    }
}
