//! Calendar API adapter.
//!
//! Lists events on a calendar over a time range, ascending by start time,
//! with recurring events expanded to single instances. Pagination is
//! followed transparently; callers always see the full window.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use wfh_core::CalendarEvent;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar adapter errors.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The provided access token was unusable before any request was made.
    #[error("invalid access token: {reason}")]
    InvalidToken { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The credentials were rejected. Revoked or expired tokens land here;
    /// the run cannot continue and the caller exits non-zero.
    #[error("calendar authorization rejected ({status}): {message}")]
    Auth { status: u16, message: String },
    /// Any other error response from the API.
    #[error("calendar API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse a response body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Calendar API client.
pub struct CalendarClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl fmt::Debug for CalendarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarClient")
            .field("api_url", &self.api_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CalendarClient {
    /// Creates a new client with the given OAuth access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, or if the
    /// HTTP client fails to build.
    pub fn new(access_token: impl Into<String>) -> Result<Self, CalendarError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(CalendarError::InvalidToken {
                reason: "access token cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(CalendarError::ClientBuild)?;

        Ok(Self {
            http,
            api_url: CALENDAR_API_URL.to_string(),
            access_token,
        })
    }

    /// Lists all events on `calendar_id` between `start` and `end`.
    ///
    /// Events arrive ascending by start time, recurring events expanded.
    /// Follows `nextPageToken` until the window is exhausted.
    pub async fn events(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = format!("{}/calendars/{calendar_id}/events", self.api_url);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&[("orderBy", "startTime"), ("singleEvents", "true")])
                .query(&[
                    ("timeMin", start.to_rfc3339()),
                    ("timeMax", end.to_rfc3339()),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(CalendarError::Auth {
                    status: status.as_u16(),
                    message: parse_api_error(&body).unwrap_or(body),
                });
            }
            if !status.is_success() {
                return Err(CalendarError::Api {
                    status: status.as_u16(),
                    message: parse_api_error(&body).unwrap_or(body),
                });
            }

            let page: EventsPage = serde_json::from_str(&body)
                .map_err(|err| CalendarError::InvalidResponse(err.to_string()))?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(count = events.len(), calendar_id, "fetched calendar events");
        Ok(events)
    }
}

/// One page of the events listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<CalendarEvent>,
    next_page_token: Option<String>,
}

fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_empty_token() {
        assert!(matches!(
            CalendarClient::new(""),
            Err(CalendarError::InvalidToken { .. })
        ));
        assert!(matches!(
            CalendarClient::new("   "),
            Err(CalendarError::InvalidToken { .. })
        ));
    }

    #[test]
    fn client_accepts_valid_token() {
        assert!(CalendarClient::new("ya29.valid-token").is_ok());
    }

    #[test]
    fn client_debug_redacts_token() {
        let client = CalendarClient::new("secret-token").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn events_page_parses_items_and_token() {
        let body = r#"{
            "items": [
                {"summary": "WFH", "start": {"date": "2025-03-12"}},
                {"start": {"dateTime": "2025-03-12T09:00:00-04:00"}}
            ],
            "nextPageToken": "page-2"
        }"#;
        let page: EventsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[1].summary.is_none());
        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
    }

    #[test]
    fn events_page_tolerates_empty_listing() {
        let page: EventsPage = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn parse_api_error_extracts_message() {
        let body = r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#;
        assert_eq!(
            parse_api_error(body).as_deref(),
            Some("Invalid Credentials")
        );
        assert!(parse_api_error("not-json").is_none());
    }
}
