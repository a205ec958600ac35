//! Weather source adapter.
//!
//! Fetches current outdoor conditions for a configured city id, imperial
//! units. Only temperature and humidity are surfaced; everything else in
//! the payload is ignored.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const OPEN_WEATHER_MAP_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Weather adapter errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provided API key was unusable before any request was made.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Any error response from the API.
    #[error("weather API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The payload parsed but lacked the expected fields.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Current conditions at the configured location, imperial units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub temperature_f: f64,
    pub humidity_pct: f64,
}

/// Weather API client.
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or whitespace-only, or if the
    /// HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(WeatherError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(WeatherError::ClientBuild)?;

        Ok(Self { http, api_key })
    }

    /// Fetches current conditions for `city_id`.
    pub async fn current_conditions(
        &self,
        city_id: &str,
    ) -> Result<CurrentConditions, WeatherError> {
        let response = self
            .http
            .get(format!("{OPEN_WEATHER_MAP_URL}/weather"))
            .query(&[
                ("APPID", self.api_key.as_str()),
                ("id", city_id),
                ("units", "imperial"),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_conditions(&body)
    }
}

fn parse_conditions(body: &str) -> Result<CurrentConditions, WeatherError> {
    #[derive(Deserialize)]
    struct Payload {
        main: Main,
    }

    #[derive(Deserialize)]
    struct Main {
        temp: f64,
        humidity: f64,
    }

    let payload: Payload = serde_json::from_str(body)
        .map_err(|err| WeatherError::InvalidResponse(err.to_string()))?;
    Ok(CurrentConditions {
        temperature_f: payload.main.temp,
        humidity_pct: payload.main.humidity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            WeatherClient::new(""),
            Err(WeatherError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = WeatherClient::new("secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parse_conditions_reads_main_block() {
        let body = r#"{"main": {"temp": 68.4, "humidity": 52, "pressure": 1016}, "wind": {}}"#;
        let conditions = parse_conditions(body).unwrap();
        assert!((conditions.temperature_f - 68.4).abs() < f64::EPSILON);
        assert!((conditions.humidity_pct - 52.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_conditions_rejects_missing_main() {
        let err = parse_conditions(r#"{"cod": 200}"#).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidResponse(_)));
    }
}
