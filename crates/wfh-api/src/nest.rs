//! Thermostat vendor API adapter.
//!
//! Reads device and structure state and writes the structure away status.
//! Writes are idempotent: structures already at the target status are
//! skipped, so the tool is safe to run from a scheduler.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use wfh_core::AwayStatus;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Public vendor endpoint; overridable through configuration.
pub const DEFAULT_NEST_API_URL: &str = "https://developer-api.nest.com";

/// Thermostat adapter errors.
#[derive(Debug, Error)]
pub enum NestError {
    /// The provided access token was unusable before any request was made.
    #[error("invalid access token: {reason}")]
    InvalidToken { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Any error response from the API.
    #[error("vendor API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse a response body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// A structure id was requested that the API did not return.
    #[error("unknown structure: {0}")]
    UnknownStructure(String),
}

/// State of one thermostat, keyed by device id in [`NestClient::thermostats`].
#[derive(Debug, Clone, Deserialize)]
pub struct Thermostat {
    pub name: String,
    pub structure_id: String,
    pub ambient_temperature_f: f64,
    pub target_temperature_high_f: f64,
    pub target_temperature_low_f: f64,
    pub humidity: f64,
    /// One of `heating`, `cooling`, `off`.
    pub hvac_state: String,
    pub fan_timer_active: bool,
}

/// State of one structure (a physical home grouping of devices).
#[derive(Debug, Clone, Deserialize)]
pub struct Structure {
    pub away: AwayStatus,
}

/// Distinct structure ids across the fetched thermostats, in device order.
#[must_use]
pub fn structure_ids(thermostats: &BTreeMap<String, Thermostat>) -> Vec<String> {
    let mut ids = Vec::new();
    for thermostat in thermostats.values() {
        if !ids.contains(&thermostat.structure_id) {
            ids.push(thermostat.structure_id.clone());
        }
    }
    ids
}

/// Thermostat vendor API client.
pub struct NestClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl fmt::Debug for NestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestClient")
            .field("api_url", &self.api_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl NestClient {
    /// Creates a new client against `api_url` with the given access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, or if the
    /// HTTP client fails to build.
    pub fn new(
        access_token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self, NestError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(NestError::InvalidToken {
                reason: "access token cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(NestError::ClientBuild)?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            access_token,
        })
    }

    /// Fetches all thermostats visible to the token, keyed by device id.
    pub async fn thermostats(&self) -> Result<BTreeMap<String, Thermostat>, NestError> {
        let body = self
            .get(&format!("{}/devices/thermostats", self.api_url))
            .await?;
        serde_json::from_str(&body).map_err(|err| NestError::InvalidResponse(err.to_string()))
    }

    /// Fetches the away state of each structure in `ids`.
    pub async fn structures(
        &self,
        ids: &[String],
    ) -> Result<BTreeMap<String, Structure>, NestError> {
        let mut structures = BTreeMap::new();
        for id in ids {
            let body = self.get(&format!("{}/structures/{id}", self.api_url)).await?;
            let structure: Structure = serde_json::from_str(&body)
                .map_err(|err| NestError::InvalidResponse(err.to_string()))?;
            structures.insert(id.clone(), structure);
        }
        Ok(structures)
    }

    /// Sets the away status of each structure in `ids`.
    ///
    /// Fetches current state first and skips structures already at the
    /// target. Returns per-structure success: the API echoes the written
    /// value, and anything else counts as failure.
    pub async fn set_away_status(
        &self,
        ids: &[String],
        status: AwayStatus,
    ) -> Result<BTreeMap<String, bool>, NestError> {
        let existing = self.structures(ids).await?;
        let mut results = BTreeMap::new();

        for id in ids {
            let current = existing
                .get(id)
                .ok_or_else(|| NestError::UnknownStructure(id.clone()))?;
            if current.away == status {
                tracing::info!(structure = %id, status = %status, "target status already set");
                continue;
            }

            tracing::info!(structure = %id, status = %status, "setting away status");
            let response = self
                .http
                .put(format!("{}/structures/{id}/away", self.api_url))
                .query(&[("auth", &self.access_token)])
                .json(&status)
                .send()
                .await?;
            let http_status = response.status();
            let body = response.text().await?;
            if !http_status.is_success() {
                return Err(NestError::Api {
                    status: http_status.as_u16(),
                    message: body,
                });
            }

            let echoed: Result<AwayStatus, _> = serde_json::from_str(&body);
            results.insert(id.clone(), echoed.is_ok_and(|echo| echo == status));
        }

        Ok(results)
    }

    async fn get(&self, url: &str) -> Result<String, NestError> {
        let response = self
            .http
            .get(url)
            .query(&[("auth", &self.access_token)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NestError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }
}
