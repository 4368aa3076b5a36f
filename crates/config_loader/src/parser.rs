//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。
//! 两种格式先解析为通用值树，检查未知键后再反序列化为 `ServiceConfig`。

use contracts::{ContractError, ServiceConfig};
use serde_json::Value;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<ServiceConfig, ContractError> {
    let document = match format {
        ConfigFormat::Toml => parse_toml(content)?,
        ConfigFormat::Json => parse_json(content)?,
    };

    let unknown = unknown_keys(&document)?;
    if !unknown.is_empty() {
        return Err(ContractError::UnknownConfigKeys { keys: unknown });
    }

    serde_json::from_value(document).map_err(|e| ContractError::ConfigParse {
        message: format!("invalid config value: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 TOML 格式文档
fn parse_toml(content: &str) -> Result<Value, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式文档
fn parse_json(content: &str) -> Result<Value, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 收集全部未知键 (`section` 或 `section.key`)
fn unknown_keys(document: &Value) -> Result<Vec<String>, ContractError> {
    let root = document
        .as_object()
        .ok_or_else(|| ContractError::config_parse("config root must be a table"))?;

    let mut unknown = Vec::new();
    for (section, body) in root {
        let Some((_, keys)) = ServiceConfig::SCHEMA
            .iter()
            .find(|(name, _)| *name == section.as_str())
        else {
            unknown.push(section.clone());
            continue;
        };
        // 非表类型交给反序列化报错
        if let Some(table) = body.as_object() {
            unknown.extend(
                table
                    .keys()
                    .filter(|key| !keys.contains(&key.as_str()))
                    .map(|key| format!("{section}.{key}")),
            );
        }
    }
    Ok(unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{ "dispatch": { "receive_timeout_ms": 20 } }"#;
        let config = parse(content, ConfigFormat::Json).unwrap();
        assert_eq!(config.dispatch.receive_timeout_ms, 20);
        assert_eq!(config.dispatch.stop_timeout_ms, 2000);
    }

    #[test]
    fn test_all_unknown_keys_are_listed() {
        let content = r#"
bus_name = "org.genivi.positioning"

[dispatch]
receive_timeout_ms = 10
retry_count = 3

[telemetry]
colour = true
"#;
        let err = parse(content, ConfigFormat::Toml).unwrap_err();
        match err {
            ContractError::UnknownConfigKeys { keys } => {
                assert_eq!(keys.len(), 3);
                assert!(keys.contains(&"bus_name".to_string()));
                assert!(keys.contains(&"dispatch.retry_count".to_string()));
                assert!(keys.contains(&"telemetry.colour".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_attribute_name() {
        let content = "[compliance]\nattributes = [\"heading\"]\n";
        let err = parse(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse("invalid toml [[[", ConfigFormat::Toml);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_json_root_must_be_object() {
        let result = parse("[1, 2]", ConfigFormat::Json);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
