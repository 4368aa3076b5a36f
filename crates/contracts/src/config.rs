//! ServiceConfig - Config Loader output
//!
//! Enumerated configuration schema. Every accepted key is listed in
//! [`ServiceConfig::SCHEMA`]; anything else is rejected by the loader.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::AttributeKey;

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Dispatch loop settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Compliance harness settings
    #[serde(default)]
    pub compliance: ComplianceConfig,

    /// Logging and metrics settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ServiceConfig {
    /// Accepted keys per section
    pub const SCHEMA: &'static [(&'static str, &'static [&'static str])] = &[
        (
            "dispatch",
            &["receive_timeout_ms", "stop_timeout_ms", "channel_capacity"],
        ),
        ("compliance", &["attributes"]),
        ("telemetry", &["log_format", "log_level", "metrics_port"]),
    ];
}

/// Dispatch loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound of one blocking receive (milliseconds)
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,

    /// Upper bound of the wait for the dispatch thread on stop (milliseconds)
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    /// Capacity of the in-process notification channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl DispatchConfig {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: default_receive_timeout_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_receive_timeout_ms() -> u64 {
    100
}

fn default_stop_timeout_ms() -> u64 {
    2000
}

fn default_channel_capacity() -> usize {
    64
}

/// Compliance harness settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Attributes requested by the one-shot check
    #[serde(default = "default_compliance_attributes")]
    pub attributes: Vec<AttributeKey>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            attributes: default_compliance_attributes(),
        }
    }
}

fn default_compliance_attributes() -> Vec<AttributeKey> {
    vec![
        AttributeKey::Latitude,
        AttributeKey::Longitude,
        AttributeKey::Altitude,
    ]
}

/// Logging and metrics settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Default log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
