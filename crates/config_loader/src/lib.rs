//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Reject keys outside the enumerated schema (all of them at once)
//! - Validate configuration values
//! - Produce a `ServiceConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("enhpos.toml")).unwrap();
//! println!("receive timeout: {:?}", config.dispatch.receive_timeout());
//! ```

mod parser;
mod validator;

pub use contracts::ServiceConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure or unknown keys
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ServiceConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let config = Self::load_from_str(&content, format)?;
        debug!(path = %path.display(), ?format, "Configuration loaded");
        Ok(config)
    }

    /// Load from `path` when given, otherwise validated defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let config = ServiceConfig::default();
                validator::validate(&config)?;
                Ok(config)
            }
        }
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure or unknown keys
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<ServiceConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize ServiceConfig to TOML string
    pub fn to_toml(config: &ServiceConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ServiceConfig to JSON string
    pub fn to_json(config: &ServiceConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
