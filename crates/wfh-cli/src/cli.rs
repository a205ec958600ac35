//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{report::ReportArgs, sync::SyncArgs};

/// Work-presence automation.
///
/// Reads work-presence markers from a calendar, optionally probes the local
/// network for a reference device, and keeps the thermostat's home/away
/// status in step.
#[derive(Debug, Parser)]
#[command(name = "wfh", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the work-hours report.
    Report(ReportArgs),

    /// Resolve presence and update the structure away status.
    Sync(SyncArgs),

    /// Show current thermostat, structure, and weather state.
    Status,
}
