//! Vendor API adapters for the work-presence automation.
//!
//! Thin HTTP wrappers around the external collaborators:
//! - [`calendar`]: calendar event listing over a time range
//! - [`nest`]: thermostat and structure state, away-status writes
//! - [`weather`]: current outdoor conditions
//! - [`metrics`]: gauge collection and pushgateway export
//!
//! Each adapter owns its `reqwest::Client` and surfaces failures through a
//! typed error enum. No adapter retries; every call is attempted exactly
//! once per run.

pub mod calendar;
pub mod metrics;
pub mod nest;
pub mod weather;

pub use calendar::{CalendarClient, CalendarError};
pub use metrics::{MetricsCollector, MetricsError, MetricsPushClient};
pub use nest::{DEFAULT_NEST_API_URL, NestClient, NestError, Structure, Thermostat, structure_ids};
pub use weather::{CurrentConditions, WeatherClient, WeatherError};
