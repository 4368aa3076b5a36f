//! # enhpos CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 一次性属性请求一致性测试 (`check`)
//! - 分发循环实时监控 (`monitor`)
//! - 配置校验 (`validate`)

mod cli;
mod commands;
mod error;
mod replay;
mod service;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_check, run_monitor, run_validate};
use config_loader::ConfigLoader;
use contracts::TelemetryConfig;
use observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options and config telemetry
    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "enhpos starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Monitor(args) => run_monitor(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging; CLI flags win over the config's telemetry section
///
/// The config is read leniently here; load errors are reported by the
/// command itself.
fn init_logging(cli: &Cli) -> Result<()> {
    let telemetry = cli
        .command
        .config_path()
        .and_then(|path| ConfigLoader::load_from_path(path).ok())
        .map(|config| config.telemetry)
        .unwrap_or_else(TelemetryConfig::default);

    let default_log_level = if cli.quiet {
        "warn".to_string()
    } else {
        match cli.verbose {
            0 => telemetry.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli
            .log_format
            .map(Into::into)
            .unwrap_or(telemetry.log_format),
        // the monitor installs the exporter itself
        metrics_port: None,
        default_log_level,
    })
}
