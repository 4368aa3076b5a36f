//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - Prometheus 指标导出 (可选)
//! - 位置属性管道指标记录
//!
//! ## 使用示例
//!
//! ```ignore
//! use contracts::ServiceConfig;
//! use observability::{init_with_config, metrics, ObservabilityConfig};
//!
//! let config = ServiceConfig::default();
//! init_with_config(ObservabilityConfig::from(&config.telemetry))?;
//!
//! // 每条通知
//! metrics::record_notification_received();
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use contracts::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use contracts::LogFormat;
pub use crate::metrics::{
    record_decode_failure, record_notification_received, record_snapshot_query,
    record_value_written,
};

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// 默认日志级别 (RUST_LOG 未设置时使用)
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::from(&TelemetryConfig::default())
    }
}

impl From<&TelemetryConfig> for ObservabilityConfig {
    fn from(telemetry: &TelemetryConfig) -> Self {
        Self {
            log_format: telemetry.log_format,
            metrics_port: telemetry.metrics_port,
            default_log_level: telemetry.log_level.clone(),
        }
    }
}

/// 使用配置初始化 Tracing 与 Prometheus
///
/// 日志写入 stderr，stdout 留给命令输出。
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    // 1. Initialize Tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_writer(std::io::stderr).compact())
            .try_init(),
    }
    .context("Failed to initialize tracing subscriber")?;

    // 2. Initialize Prometheus Exporter (if enabled)
    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// 仅初始化 Prometheus 指标（不初始化 Tracing）
///
/// 用于 Tracing 已由其他模块初始化的场景（例如 CLI 的 `-v/-q` 参数）。
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
