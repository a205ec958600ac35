//! Work-presence automation CLI library.
//!
//! This crate provides the CLI interface for the `wfh` binary.

mod cli;
pub mod commands;
mod config;
pub mod net;

pub use cli::{Cli, Commands};
pub use config::{Config, SourceKind};
