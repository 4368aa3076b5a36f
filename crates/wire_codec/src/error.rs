//! Decode error types

use contracts::{AttributeKey, AttributeMask, AttributeValue};
use thiserror::Error;

use crate::tag::describe;

/// Decode-time failure of one message
///
/// All variants are detected locally and are not retriable for the same
/// message instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Top-level container shape is wrong
    #[error("malformed envelope: {message}")]
    MalformedEnvelope { message: String },

    /// Dictionary key is not a uint16 wire code
    #[error("wrong key type: expected 'q', found {}", describe(*.found))]
    WrongKeyType { found: u8 },

    /// Dictionary value is not a variant
    #[error("expected variant value, found {}", describe(*.found))]
    ExpectedVariant { found: u8 },

    /// Variant does not hold a double
    #[error("wrong value type: expected 'd', found {}", describe(*.0))]
    WrongValueType(u8),

    /// Value outside the key's physical bounds
    #[error("{key} value {value} out of range")]
    OutOfRange {
        key: AttributeKey,
        value: AttributeValue,
    },

    /// Payload carries a key the change mask does not flag
    #[error("{key} present in payload but not flagged by mask {mask}")]
    MaskMismatch {
        key: AttributeKey,
        mask: AttributeMask,
    },

    /// Same key appears twice in one dictionary
    #[error("duplicate {0} entry")]
    DuplicateKey(AttributeKey),

    /// Input ended inside a value
    #[error("truncated message: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Bytes left after the message
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
}

impl DecodeError {
    /// Create a malformed envelope error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            message: message.into(),
        }
    }

    /// Short stable label (used for metrics)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope { .. } => "malformed_envelope",
            Self::WrongKeyType { .. } => "wrong_key_type",
            Self::ExpectedVariant { .. } => "expected_variant",
            Self::WrongValueType(_) => "wrong_value_type",
            Self::OutOfRange { .. } => "out_of_range",
            Self::MaskMismatch { .. } => "mask_mismatch",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::Truncated { .. } => "truncated",
            Self::TrailingBytes(_) => "trailing_bytes",
        }
    }
}
