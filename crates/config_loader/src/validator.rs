//! 配置校验模块
//!
//! 校验规则：
//! - 超时与通道容量 > 0
//! - compliance.attributes 非空且无重复
//! - log_level 为已知级别
//! - metrics_port != 0

use std::collections::HashSet;

use contracts::{ContractError, ServiceConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// 校验 ServiceConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ServiceConfig) -> Result<(), ContractError> {
    validate_dispatch(config)?;
    validate_compliance(config)?;
    validate_telemetry(config)?;
    Ok(())
}

/// 校验分发循环参数
fn validate_dispatch(config: &ServiceConfig) -> Result<(), ContractError> {
    let dispatch = &config.dispatch;
    let positive = [
        ("dispatch.receive_timeout_ms", dispatch.receive_timeout_ms),
        ("dispatch.stop_timeout_ms", dispatch.stop_timeout_ms),
        ("dispatch.channel_capacity", dispatch.channel_capacity as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }
    Ok(())
}

/// 校验一致性测试请求的属性
fn validate_compliance(config: &ServiceConfig) -> Result<(), ContractError> {
    let attributes = &config.compliance.attributes;
    if attributes.is_empty() {
        return Err(ContractError::config_validation(
            "compliance.attributes",
            "at least one attribute is required",
        ));
    }

    let mut seen = HashSet::new();
    for key in attributes {
        if !seen.insert(key) {
            return Err(ContractError::config_validation(
                "compliance.attributes",
                format!("duplicate attribute '{key}'"),
            ));
        }
    }
    Ok(())
}

/// 校验日志与指标配置
fn validate_telemetry(config: &ServiceConfig) -> Result<(), ContractError> {
    let telemetry = &config.telemetry;
    if !LOG_LEVELS.contains(&telemetry.log_level.to_lowercase().as_str()) {
        return Err(ContractError::config_validation(
            "telemetry.log_level",
            format!(
                "unknown log level '{}', expected one of: {}",
                telemetry.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if telemetry.metrics_port == Some(0) {
        return Err(ContractError::config_validation(
            "telemetry.metrics_port",
            "must be > 0",
        ));
    }
    Ok(())
}
