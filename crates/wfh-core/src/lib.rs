//! Core domain logic for the work-presence automation.
//!
//! This crate contains the fundamental types and logic for:
//! - Marker classification: reading work-presence intent from event summaries
//! - Work-duration aggregation: reducing a day's events to one report line
//! - Presence resolution: deciding the home/away status from pluggable signals

pub mod event;
pub mod marker;
pub mod presence;
pub mod report;

pub use event::{CalendarEvent, EventStart};
pub use marker::WorkMarker;
pub use presence::{
    AwayStatus, CalendarSignal, Presence, PresenceSignal, SignalError, resolve_presence,
    status_requests,
};
pub use report::{ReportLine, ReportMode, UnknownReportMode, aggregate, render};
