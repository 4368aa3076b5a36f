//! Snapshot - attribute values observed at one instant

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AttributeKey, AttributeMask, AttributeValue};

/// Mapping of attribute keys to values, plus the time it was taken.
///
/// Snapshots decoded from the wire carry no timestamp; the query facade
/// stamps its snapshots with wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,

    /// Attribute values
    pub values: BTreeMap<AttributeKey, AttributeValue>,
}

impl Snapshot {
    /// Create an empty, unstamped snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty snapshot stamped with `timestamp_ms`
    pub fn stamped(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: AttributeKey, value: AttributeValue) -> Option<AttributeValue> {
        self.values.insert(key, value)
    }

    pub fn get(&self, key: AttributeKey) -> Option<AttributeValue> {
        self.values.get(&key).copied()
    }

    pub fn contains(&self, key: AttributeKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys present in this snapshot
    pub fn mask(&self) -> AttributeMask {
        self.values.keys().copied().collect()
    }

    /// Iterate `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, AttributeValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Copy restricted to the keys in `mask`
    pub fn restricted_to(&self, mask: AttributeMask) -> Self {
        Self {
            timestamp_ms: self.timestamp_ms,
            values: self
                .values
                .iter()
                .filter(|(key, _)| mask.contains(**key))
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }
}
