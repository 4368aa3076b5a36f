//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the position pipeline.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data Model
//! - [`AttributeKey`]: fixed set of position attributes with stable wire codes
//! - [`AttributeMask`]: bit-set over attribute keys (requests and change notifications)
//! - [`Snapshot`]: attribute values observed at one instant
//!
//! ## Collaborators
//! - [`BusConnector`] / [`NotificationSource`]: the bus the dispatch loop listens on
//! - [`SnapshotProvider`]: the read surface exposed to bridges and test harnesses

mod attribute;
mod bus;
mod config;
mod error;
mod snapshot;

pub use attribute::{AttributeKey, AttributeMask, AttributeValue};
pub use bus::{BusConnector, NotificationSource, Received, SnapshotProvider};
pub use config::*;
pub use error::*;
pub use snapshot::Snapshot;
