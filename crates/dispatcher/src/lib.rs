//! # Dispatcher
//!
//! Dispatch Loop: listens for position update notifications on a dedicated
//! thread and republishes them into the shared [`AttributeCache`].
//!
//! Responsibilities:
//! - `Idle → Connected → Listening → Stopped` lifecycle
//! - Decode failures are logged and counted, never fatal
//! - Bounded receive and bounded stop wait
//!
//! [`channel_bus`] provides an in-process notification bus for
//! replay, simulation and tests.
//!
//! [`AttributeCache`]: attribute_cache::AttributeCache

pub mod channel_bus;
pub mod dispatcher;
pub mod error;
pub mod metrics;

pub use channel_bus::{channel_bus, ChannelConnector, ChannelSource, NotificationPublisher};
pub use dispatcher::{DispatchLoop, LoopState, StopOutcome};
pub use error::DispatchError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
