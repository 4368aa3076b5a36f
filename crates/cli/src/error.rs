//! Error types for CLI operations.

use contracts::AttributeKey;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Replay file ends inside a frame
    #[error("Replay file truncated: frame at offset {offset} needs {needed} bytes, {remaining} left")]
    ReplayTruncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Requested attribute missing from the reply
    #[error("Requested attribute '{0}' missing from reply")]
    MissingAttribute(AttributeKey),

    /// Reply failed to decode or validate
    #[error("Reply rejected: {0}")]
    Decode(#[from] wire_codec::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
