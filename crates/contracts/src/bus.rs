//! Bus collaborator traits
//!
//! Connection setup, authentication and service discovery live outside the
//! pipeline. The dispatch loop only needs a connector that yields a live
//! notification source, and external readers only need a snapshot provider.

use bytes::Bytes;
use std::time::Duration;

use crate::{ContractError, Snapshot};

/// Outcome of one bounded receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// One raw notification payload
    Message(Bytes),
    /// Nothing arrived within the timeout
    Timeout,
    /// The producer side is gone; no further messages will arrive
    Closed,
}

/// Source of raw update notifications
///
/// Owned by exactly one dispatch thread. `receive` must return within
/// (approximately) `timeout` so that stop requests are observed.
pub trait NotificationSource: Send {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Wait up to `timeout` for the next notification
    ///
    /// # Errors
    /// Returns a transport error; the caller decides whether to retry
    fn receive(&mut self, timeout: Duration) -> Result<Received, ContractError>;
}

/// Connect operation yielding a live notification source
pub trait BusConnector {
    /// Establish the connection
    ///
    /// # Errors
    /// Returns a connection error; nothing is retried here
    fn connect(&mut self) -> Result<Box<dyn NotificationSource>, ContractError>;
}

/// Read surface for bridges and test harnesses
pub trait SnapshotProvider: Send + Sync {
    /// Current value of every attribute
    fn snapshot_all(&self) -> Snapshot;
}
