//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use config_loader::ConfigLoader;
use contracts::ServiceConfig;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ServiceConfig>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config_path = args
        .config
        .as_ref()
        .map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string());
    info!(config = %config_path, "Validating configuration");

    let result = match ConfigLoader::load_or_default(args.config.as_deref()) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                config: Some(config),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            config: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result)?;
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ServiceConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let dispatch = &config.dispatch;

    if dispatch.stop_timeout_ms < dispatch.receive_timeout_ms {
        warnings.push(format!(
            "dispatch.stop_timeout_ms ({}) is shorter than dispatch.receive_timeout_ms ({}) - stop will usually time out",
            dispatch.stop_timeout_ms, dispatch.receive_timeout_ms
        ));
    }

    if dispatch.receive_timeout_ms > 1000 {
        warnings.push(format!(
            "dispatch.receive_timeout_ms ({}) delays stop requests by up to that long",
            dispatch.receive_timeout_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) -> Result<()> {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref config) = result.config {
            println!();
            print!(
                "{}",
                ConfigLoader::to_toml(config).context("Failed to render configuration")?
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let args = ValidateArgs {
            config: None,
            json: true,
        };
        assert!(run_validate(&args).is_ok());
    }

    #[test]
    fn test_unknown_keys_invalid() {
        let file = write_config("[dispatch]\nretries = 3\n");
        let args = ValidateArgs {
            config: Some(file.path().to_path_buf()),
            json: false,
        };
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_warnings() {
        let mut config = ServiceConfig::default();
        assert!(collect_warnings(&config).is_empty());

        config.dispatch.stop_timeout_ms = 50;
        assert_eq!(collect_warnings(&config).len(), 1);
    }
}
