//! # Attribute Cache
//!
//! Latest known value per position attribute, shared between the dispatch
//! thread (single writer) and any number of readers.
//!
//! - [`AttributeCache`]: one independently locked slot per [`AttributeKey`]
//! - [`QueryFacade`]: read-only view returning timestamped snapshots
//!
//! The cache is passed around explicitly as `Arc<AttributeCache>`.
//!
//! [`AttributeKey`]: contracts::AttributeKey

mod cache;
mod facade;

pub use cache::AttributeCache;
pub use facade::QueryFacade;
