//! Status command: read-only view of thermostat, structure, and weather
//! state. Never writes anything.

use std::io::Write;

use anyhow::{Context, Result};

use wfh_api::{NestClient, Thermostat, WeatherClient, structure_ids};

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;

    let nest = NestClient::new(config.nest_token()?, config.nest_api_url.clone())?;
    let thermostats = runtime
        .block_on(nest.thermostats())
        .context("failed to fetch thermostats")?;

    if thermostats.is_empty() {
        writeln!(writer, "No thermostats visible to this token.")?;
        return Ok(());
    }

    writeln!(writer, "Thermostats:")?;
    for (id, thermostat) in &thermostats {
        writeln!(writer, "{}", thermostat_line(id, thermostat))?;
    }

    let ids = structure_ids(&thermostats);
    let structures = runtime
        .block_on(nest.structures(&ids))
        .context("failed to fetch structures")?;
    writeln!(writer, "Structures:")?;
    for (id, structure) in &structures {
        writeln!(writer, "- {id}: {}", structure.away)?;
    }

    if let Some((key, city)) = config.weather_location() {
        let conditions = runtime
            .block_on(WeatherClient::new(key)?.current_conditions(city))
            .context("failed to fetch weather")?;
        writeln!(
            writer,
            "Outside: {:.1}F, {:.0}% humidity",
            conditions.temperature_f, conditions.humidity_pct
        )?;
    }

    Ok(())
}

fn thermostat_line(id: &str, thermostat: &Thermostat) -> String {
    let fan = if thermostat.fan_timer_active { "on" } else { "off" };
    format!(
        "- {} ({id}): {:.1}F ambient, {:.0}% humidity, target {:.1}-{:.1}F, hvac {}, fan {fan}",
        thermostat.name,
        thermostat.ambient_temperature_f,
        thermostat.humidity,
        thermostat.target_temperature_low_f,
        thermostat.target_temperature_high_f,
        thermostat.hvac_state,
    )
}
