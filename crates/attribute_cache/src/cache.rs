//! Per-slot locked attribute store

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{AttributeKey, AttributeValue, Snapshot};
use parking_lot::RwLock;
use tracing::trace;

/// Latest value per attribute
///
/// Each slot has its own lock, so a single slot is never torn. There is no
/// cross-slot atomicity: a reader walking several keys while the writer
/// applies a snapshot may see some keys updated and others not.
#[derive(Debug)]
pub struct AttributeCache {
    slots: [RwLock<AttributeValue>; AttributeKey::COUNT],
    writes: AtomicU64,
}

impl AttributeCache {
    /// Every slot starts at `0.0`
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| RwLock::new(0.0)),
            writes: AtomicU64::new(0),
        }
    }

    /// Overwrite one slot
    pub fn set(&self, key: AttributeKey, value: AttributeValue) {
        *self.slots[key.index()].write() = value;
        self.writes.fetch_add(1, Ordering::Release);
        observability::record_value_written(key);
        trace!(attribute = %key, value, "attribute cached");
    }

    /// Current value of one slot; `0.0` before the first write
    pub fn get(&self, key: AttributeKey) -> AttributeValue {
        *self.slots[key.index()].read()
    }

    /// Write every pair of `snapshot`, one slot at a time
    pub fn apply(&self, snapshot: &Snapshot) {
        for (key, value) in snapshot.iter() {
            self.set(key, value);
        }
    }

    /// Total number of slot writes since creation
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }
}

impl Default for AttributeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults_to_zero() {
        let cache = AttributeCache::new();
        for key in AttributeKey::ALL {
            assert_eq!(cache.get(key), 0.0);
        }
        assert_eq!(cache.write_count(), 0);
    }

    #[test]
    fn test_set_and_apply() {
        let cache = AttributeCache::new();
        cache.set(AttributeKey::Speed, 12.5);
        assert_eq!(cache.get(AttributeKey::Speed), 12.5);

        let snapshot = Snapshot::new()
            .with(AttributeKey::Latitude, 47.31608607)
            .with(AttributeKey::Altitude, 337.0);
        cache.apply(&snapshot);

        assert_eq!(cache.get(AttributeKey::Latitude), 47.31608607);
        assert_eq!(cache.get(AttributeKey::Altitude), 337.0);
        assert_eq!(cache.get(AttributeKey::Longitude), 0.0);
        assert_eq!(cache.write_count(), 3);
    }

    #[test]
    fn test_concurrent_single_slot_never_torn() {
        let cache = Arc::new(AttributeCache::new());
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let cache = Arc::clone(&cache);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut reads = 0u64;
                while !done.load(Ordering::Acquire) || reads == 0 {
                    let value = cache.get(AttributeKey::Latitude);
                    assert!(value == 0.0 || value == 10.0, "torn read: {value}");
                    reads += 1;
                }
                reads
            })
        };

        cache.set(AttributeKey::Latitude, 10.0);
        done.store(true, Ordering::Release);

        assert!(reader.join().unwrap() > 0);
        assert_eq!(cache.get(AttributeKey::Latitude), 10.0);
    }

    #[test]
    fn test_multi_key_reads_are_per_slot() {
        // a reader between two sets sees the first key updated only
        let cache = AttributeCache::new();
        cache.set(AttributeKey::Latitude, 1.0);
        let torn = (
            cache.get(AttributeKey::Latitude),
            cache.get(AttributeKey::Longitude),
        );
        cache.set(AttributeKey::Longitude, 2.0);
        assert_eq!(torn, (1.0, 0.0));
    }
}
