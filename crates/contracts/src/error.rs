//! Layered error definitions
//!
//! Categorized by source: config / attribute / bus

use thiserror::Error;

/// Unified error type for contract-level collaborators
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Keys that are not part of the configuration schema
    #[error("unknown config keys: {}", keys.join(", "))]
    UnknownConfigKeys { keys: Vec<String> },

    // ===== Attribute Errors =====
    /// Attribute name that does not match any key
    #[error("unknown attribute: '{0}'")]
    UnknownAttribute(String),

    // ===== Bus Errors =====
    /// Bus connection error
    #[error("bus connection error: {message}")]
    BusConnection { message: String },

    /// Bus receive error
    #[error("bus receive error on '{source_name}': {message}")]
    BusReceive {
        source_name: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create bus connection error
    pub fn bus_connection(message: impl Into<String>) -> Self {
        Self::BusConnection {
            message: message.into(),
        }
    }

    /// Create bus receive error
    pub fn bus_receive(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusReceive {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
