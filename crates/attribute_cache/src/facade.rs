//! Query Facade

use std::sync::Arc;

use chrono::Utc;
use contracts::{AttributeKey, Snapshot, SnapshotProvider};

use crate::AttributeCache;

/// Read-only view over the cache
///
/// Cloning is cheap; every clone reads the same cache.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    cache: Arc<AttributeCache>,
}

impl QueryFacade {
    pub fn new(cache: Arc<AttributeCache>) -> Self {
        Self { cache }
    }

    /// Every attribute read slot by slot, stamped with the current time
    ///
    /// Never fails. The result may mix values from two consecutive
    /// notifications.
    pub fn snapshot_all(&self) -> Snapshot {
        observability::record_snapshot_query();

        let timestamp_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut snapshot = Snapshot::stamped(timestamp_ms);
        for key in AttributeKey::ALL {
            snapshot.insert(key, self.cache.get(key));
        }
        snapshot
    }

    /// Single attribute
    pub fn get(&self, key: AttributeKey) -> f64 {
        self.cache.get(key)
    }
}

impl SnapshotProvider for QueryFacade {
    fn snapshot_all(&self) -> Snapshot {
        QueryFacade::snapshot_all(self)
    }
}
