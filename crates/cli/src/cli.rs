//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::AttributeKey;
use std::path::{Path, PathBuf};

/// enhpos - Enhanced position attribute pipeline tools
#[derive(Parser, Debug)]
#[command(
    name = "enhpos",
    author,
    version,
    about = "Enhanced position attribute compliance harness and monitor",
    long_about = "Tools for the enhanced position attribute protocol.\n\n\
                  Runs the one-shot request/reply compliance check, monitors \n\
                  update notifications through the dispatch loop, and validates \n\
                  service configuration."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ENHPOS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (defaults to telemetry.log_format from the config)
    #[arg(long, value_enum, global = true, env = "ENHPOS_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request attributes once, decode and validate the reply
    Check(CheckArgs),

    /// Run the dispatch loop and print the cached position periodically
    Monitor(MonitorArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

impl Commands {
    /// Configuration file named by the command, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Self::Check(args) => args.config.as_deref(),
            Self::Monitor(args) => args.config.as_deref(),
            Self::Validate(args) => args.config.as_deref(),
        }
    }
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "ENHPOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Encoded reply to check instead of asking the simulated service
    #[arg(long)]
    pub reply: Option<PathBuf>,

    /// Attributes to request (overrides compliance.attributes)
    #[arg(long, value_delimiter = ',')]
    pub attributes: Option<Vec<AttributeKey>>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `monitor` command
#[derive(Parser, Debug, Clone)]
pub struct MonitorArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "ENHPOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Replay notifications from a frame file (u32 LE length-prefixed)
    #[arg(long, conflicts_with = "simulate", required_unless_present = "simulate")]
    pub replay: Option<PathBuf>,

    /// Feed notifications from the built-in simulated service
    #[arg(long)]
    pub simulate: bool,

    /// Print interval in milliseconds (also the simulated update period)
    #[arg(long, default_value = "500", env = "ENHPOS_INTERVAL_MS")]
    pub interval_ms: u64,

    /// Stop after this many seconds (0 = until Ctrl+C or end of replay)
    #[arg(long, default_value = "0")]
    pub duration_secs: u64,

    /// Print snapshots as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate (defaults are checked when absent)
    #[arg(short, long, env = "ENHPOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for contracts::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
