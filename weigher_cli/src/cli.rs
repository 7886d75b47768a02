//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "weigher", version, about = "Serial scale reader CLI")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/weigher.toml")]
    pub config: PathBuf,

    /// Emit events and logs as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream readings from the scale and report changed/stabilized weights
    Watch {
        /// Serial device to open (overrides config)
        #[arg(long, value_name = "DEVICE")]
        port: Option<String>,

        /// Replay a capture file instead of opening a serial device
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,

        /// Stop after this many completed records (default: run until Ctrl+C)
        #[arg(long, value_name = "N")]
        max_records: Option<u64>,

        /// Print run counters on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Open the configured byte source, check readiness, and close it
    SelfCheck {
        /// Serial device to open (overrides config)
        #[arg(long, value_name = "DEVICE")]
        port: Option<String>,

        /// Check a replay capture file instead of a serial device
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,
    },
}
