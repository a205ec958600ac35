//! Sync command: resolve presence and update the structure away status.
//!
//! One pass: evaluate the configured presence sources in order, apply the
//! resulting status to every structure (writes are skipped without
//! `--apply`), then populate and push metrics when a gateway is configured.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Args;

use wfh_api::{
    CalendarClient, MetricsCollector, MetricsPushClient, NestClient, Thermostat, WeatherClient,
    structure_ids,
};
use wfh_core::{
    AwayStatus, CalendarSignal, Presence, PresenceSignal, resolve_presence,
};

use crate::commands::util::local_midnight;
use crate::net::NetworkSignal;
use crate::{Config, SourceKind};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Apply the resulting status change instead of only reporting it.
    #[arg(long)]
    pub apply: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &SyncArgs, config: &Config) -> Result<()> {
    let tz = config.work_timezone()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let now = Utc::now().with_timezone(&tz);

    let mut signals: Vec<Box<dyn PresenceSignal>> = Vec::new();
    for kind in &config.presence_sources {
        match kind {
            SourceKind::Calendar => {
                let today = local_midnight(now.date_naive(), tz);
                let tomorrow = today + Duration::days(1);
                let client = CalendarClient::new(config.calendar_token()?)?;
                let events = runtime
                    .block_on(client.events(
                        &config.calendar_id,
                        today.with_timezone(&Utc),
                        tomorrow.with_timezone(&Utc),
                    ))
                    .context("failed to fetch calendar events")?;
                if events.is_empty() {
                    tracing::info!("no calendar events today");
                }
                signals.push(Box::new(CalendarSignal::new(now, events)));
            }
            SourceKind::Network => {
                signals.push(Box::new(NetworkSignal::new(
                    config.subnet()?,
                    config.reference_mac()?,
                )));
            }
        }
    }

    let presence = resolve_presence(&mut signals);
    writeln!(writer, "Presence: {presence}")?;

    let target = match presence {
        Presence::Home => Some(AwayStatus::Home),
        Presence::Away => Some(AwayStatus::Away),
        Presence::Unknown => None,
    };

    let nest = NestClient::new(config.nest_token()?, config.nest_api_url.clone())?;
    let thermostats = runtime
        .block_on(nest.thermostats())
        .context("failed to fetch thermostats")?;
    let structures = structure_ids(&thermostats);

    match target {
        Some(status) if args.apply => {
            let results = runtime
                .block_on(nest.set_away_status(&structures, status))
                .context("failed to set away status")?;
            for (id, confirmed) in &results {
                let outcome = if *confirmed { "updated" } else { "write not confirmed" };
                writeln!(writer, "{id}: {outcome}")?;
            }
            let skipped = structures.len() - results.len();
            if skipped > 0 {
                writeln!(writer, "{skipped} structure(s) already {status}")?;
            }
        }
        Some(status) => {
            writeln!(
                writer,
                "Would set {} structure(s) to {status} (pass --apply)",
                structures.len()
            )?;
        }
        None => {
            writeln!(writer, "No status change requested")?;
        }
    }

    if let Some(gateway) = config.pushgateway_url.as_deref() {
        // Metrics failures never abort a run that already did its real work.
        if let Err(error) = runtime.block_on(push_metrics(gateway, config, &nest, &thermostats)) {
            tracing::warn!(%error, "metrics push failed");
        }
    }

    Ok(())
}

/// Populates the per-run collector from thermostat, structure, and weather
/// state and pushes it to the gateway.
async fn push_metrics(
    gateway: &str,
    config: &Config,
    nest: &NestClient,
    thermostats: &BTreeMap<String, Thermostat>,
) -> Result<()> {
    let mut collector = MetricsCollector::new();

    for thermostat in thermostats.values() {
        collector.set(
            "nest_ambient_temperature_f",
            thermostat.ambient_temperature_f,
        );
        collector.set(
            "nest_target_temperature_high_f",
            thermostat.target_temperature_high_f,
        );
        collector.set(
            "nest_target_temperature_low_f",
            thermostat.target_temperature_low_f,
        );
        collector.set("nest_humidity", thermostat.humidity);
        collector.set("nest_hvac_state", hvac_state_value(&thermostat.hvac_state));
        collector.set(
            "nest_fan_active",
            if thermostat.fan_timer_active { 1.0 } else { 0.0 },
        );
    }

    let ids = structure_ids(thermostats);
    let structures = nest.structures(&ids).await?;
    if let Some(structure) = structures.values().next() {
        collector.set("nest_user_state", away_status_value(structure.away));
    }

    if let Some((key, city)) = config.weather_location() {
        match WeatherClient::new(key)?.current_conditions(city).await {
            Ok(conditions) => {
                collector.set("weather_temperature_f", conditions.temperature_f);
                collector.set("weather_humidity_pct", conditions.humidity_pct);
            }
            // Outside conditions are nice to have; the push still goes out.
            Err(error) => tracing::warn!(%error, "weather fetch failed"),
        }
    }

    MetricsPushClient::new(gateway, &config.metrics_job)?
        .push(&collector)
        .await?;
    Ok(())
}

/// Gauge encoding of the HVAC state.
fn hvac_state_value(state: &str) -> f64 {
    match state {
        "off" => 0.0,
        "heating" => 1.0,
        "cooling" => 2.0,
        _ => -1.0,
    }
}

/// Gauge encoding of the structure away status.
const fn away_status_value(status: AwayStatus) -> f64 {
    match status {
        AwayStatus::Home => 0.0,
        AwayStatus::Away => 1.0,
        AwayStatus::AutoAway => 2.0,
    }
}
