//! Report command for generating the work-hours report.
//!
//! The window is expressed in weeks ago relative to local midnight in the
//! work calendar's timezone: `--start-weeks 4` with the default
//! `--end-weeks 0` covers the last four weeks up to today.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Args;

use wfh_api::CalendarClient;
use wfh_core::{ReportMode, aggregate, render};

use crate::Config;
use crate::commands::util::local_midnight;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Weeks ago to start the report window.
    #[arg(long, default_value_t = 12)]
    pub start_weeks: i64,

    /// Weeks ago to end the report window.
    #[arg(long, default_value_t = 0)]
    pub end_weeks: i64,

    /// Output format: human, plot, csv, or sheets.
    #[arg(long, default_value = "human")]
    pub mode: ReportMode,
}

pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let tz = config.work_timezone()?;
    let now = Utc::now().with_timezone(&tz);
    let today = local_midnight(now.date_naive(), tz) - Duration::weeks(args.end_weeks);
    let start = today - Duration::weeks(args.start_weeks);
    tracing::debug!(%start, end = %today, "report window");

    let client = CalendarClient::new(config.calendar_token()?)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let events = runtime
        .block_on(client.events(
            &config.calendar_id,
            start.with_timezone(&Utc),
            today.with_timezone(&Utc),
        ))
        .context("failed to fetch calendar events")?;

    if events.is_empty() {
        tracing::info!("no events in the report window");
        return Ok(());
    }

    let report = aggregate(&events, tz);
    render(writer, &report, args.mode).context("failed to write report")?;
    Ok(())
}
