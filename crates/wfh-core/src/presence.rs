//! Presence resolution: from calendar markers and other signals to a
//! home/away decision.
//!
//! Signal sources implement [`PresenceSignal`] and are run in configured
//! order by [`resolve_presence`]; the first definite answer wins.

use std::fmt;

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::CalendarEvent;
use crate::marker::WorkMarker;

/// The vendor's coarse presence mode for a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AwayStatus {
    Home,
    Away,
    /// Set by the vendor itself; never requested by us.
    AutoAway,
}

impl AwayStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
            Self::AutoAway => "auto-away",
        }
    }
}

impl fmt::Display for AwayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AwayStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            "auto-away" => Ok(Self::AutoAway),
            _ => Err(format!("invalid away status: {s}")),
        }
    }
}

/// Status transitions requested by one day's calendar events.
///
/// A WFH marker anywhere in the day requests `Home` unconditionally.
/// Otherwise each timed event on `now`'s date contributes by marker and
/// time of day: "entered work" requests `Away` until noon, "exited work"
/// requests `Home` after it. Several events may request several (idempotent)
/// transitions in one run; callers apply them in order, last wins.
#[must_use]
pub fn status_requests(now: DateTime<Tz>, events: &[CalendarEvent]) -> Vec<AwayStatus> {
    let wfh = events
        .iter()
        .any(|event| WorkMarker::classify(event.summary.as_deref()) == WorkMarker::WorkFromHome);
    if wfh {
        return vec![AwayStatus::Home];
    }

    let today = now.date_naive();
    let mut requests = Vec::new();
    for event in events {
        let Some(start) = event.start.timed() else {
            continue;
        };
        if start.with_timezone(&now.timezone()).date_naive() != today {
            continue;
        }
        match WorkMarker::classify(event.summary.as_deref()) {
            WorkMarker::EnteredWork if now.hour() <= 12 => requests.push(AwayStatus::Away),
            WorkMarker::ExitedWork if now.hour() > 12 => requests.push(AwayStatus::Home),
            _ => {}
        }
    }
    requests
}

/// Presence answer from a single signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Home,
    Away,
    Unknown,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Home => "home",
            Self::Away => "away",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Error from a presence signal source.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SignalError(String);

impl SignalError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A pluggable presence signal source.
///
/// Implementations answer from whatever they observe (calendar markers, a
/// device on the local network); [`Presence::Unknown`] passes the decision
/// to the next configured source.
pub trait PresenceSignal {
    /// Name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// The source's current answer.
    fn detect(&mut self) -> Result<Presence, SignalError>;
}

/// Runs the sources in order and returns the first definite answer.
///
/// A failing source is logged and skipped; it never aborts the run.
pub fn resolve_presence(signals: &mut [Box<dyn PresenceSignal>]) -> Presence {
    for signal in signals {
        match signal.detect() {
            Ok(Presence::Unknown) => {
                tracing::debug!(source = signal.name(), "no answer from source");
            }
            Ok(answer) => {
                tracing::info!(source = signal.name(), %answer, "presence resolved");
                return answer;
            }
            Err(error) => {
                tracing::warn!(source = signal.name(), %error, "presence source failed");
            }
        }
    }
    Presence::Unknown
}

/// Calendar-backed presence source over an already-fetched day of events.
#[derive(Debug)]
pub struct CalendarSignal {
    now: DateTime<Tz>,
    events: Vec<CalendarEvent>,
}

impl CalendarSignal {
    #[must_use]
    pub const fn new(now: DateTime<Tz>, events: Vec<CalendarEvent>) -> Self {
        Self { now, events }
    }
}

impl PresenceSignal for CalendarSignal {
    fn name(&self) -> &'static str {
        "calendar"
    }

    fn detect(&mut self) -> Result<Presence, SignalError> {
        // The request sequence is idempotent and last-wins, so only the
        // final transition matters here.
        let answer = match status_requests(self.now, &self.events).last() {
            Some(AwayStatus::Away) => Presence::Away,
            Some(_) => Presence::Home,
            None => Presence::Unknown,
        };
        Ok(answer)
    }
}
