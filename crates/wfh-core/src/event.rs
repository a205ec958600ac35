//! Calendar event model.
//!
//! Mirrors the calendar API's event resource closely enough to deserialize
//! straight from the wire: the `start` entity carries either a bare `date`
//! (all-day events) or a `dateTime` with a UTC offset (timed events).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

/// One event returned by the calendar source.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    pub summary: Option<String>,
    pub start: EventStart,
}

/// The `start` entity of a calendar event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    /// Set for all-day events.
    pub date: Option<NaiveDate>,
    /// Set for timed events.
    pub date_time: Option<DateTime<FixedOffset>>,
}

impl EventStart {
    /// The start timestamp, if this is a timed event.
    #[must_use]
    pub const fn timed(&self) -> Option<DateTime<FixedOffset>> {
        self.date_time
    }

    /// The calendar date the event starts on, regardless of start form.
    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        self.date
            .or_else(|| self.date_time.map(|dt| dt.date_naive()))
    }
}

impl CalendarEvent {
    /// Convenience constructor for an all-day event.
    #[must_use]
    pub fn all_day(summary: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            summary: Some(summary.into()),
            start: EventStart {
                date: Some(date),
                date_time: None,
            },
        }
    }

    /// Convenience constructor for a timed event.
    #[must_use]
    pub fn timed(summary: impl Into<String>, start: DateTime<FixedOffset>) -> Self {
        Self {
            summary: Some(summary.into()),
            start: EventStart {
                date: None,
                date_time: Some(start),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_all_day_event() {
        let event: CalendarEvent =
            serde_json::from_str(r#"{"summary": "WFH", "start": {"date": "2025-03-10"}}"#).unwrap();
        assert_eq!(event.summary.as_deref(), Some("WFH"));
        assert_eq!(
            event.start.day(),
            Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
        );
        assert!(event.start.timed().is_none());
    }

    #[test]
    fn deserializes_timed_event() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"summary": "I entered work", "start": {"dateTime": "2025-03-10T09:00:00-07:00"}}"#,
        )
        .unwrap();
        let start = event.start.timed().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-10T09:00:00-07:00");
        assert_eq!(
            event.start.day(),
            Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
        );
    }

    #[test]
    fn tolerates_missing_summary() {
        let event: CalendarEvent =
            serde_json::from_str(r#"{"start": {"date": "2025-03-10"}}"#).unwrap();
        assert!(event.summary.is_none());
    }
}
