//! Dispatcher error types

use thiserror::Error;

use crate::dispatcher::LoopState;

/// Dispatch loop errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Operation not allowed in the current state
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: LoopState,
    },

    /// Bus connector failed
    #[error("connect failed: {0}")]
    Connect(#[from] contracts::ContractError),

    /// Dispatch thread could not be started
    #[error("failed to spawn dispatch thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Dispatch thread panicked before stop completed
    #[error("dispatch thread '{name}' panicked")]
    WorkerPanicked { name: String },
}

impl DispatchError {
    pub(crate) fn invalid_state(operation: &'static str, state: LoopState) -> Self {
        Self::InvalidState { operation, state }
    }
}
