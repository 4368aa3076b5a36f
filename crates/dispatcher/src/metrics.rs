//! Dispatch loop metrics for observability

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the loop handle and its worker thread
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Notifications taken off the source
    received: AtomicU64,
    /// Notifications decoded and written to the cache
    applied: AtomicU64,
    /// Notifications discarded by the decoder
    decode_failures: AtomicU64,
    /// Individual attribute values written
    values_written: AtomicU64,
    /// Transport errors from the source
    receive_errors: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn inc_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    pub fn inc_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn values_written(&self) -> u64 {
        self.values_written.load(Ordering::Relaxed)
    }

    pub fn add_values_written(&self, count: u64) {
        self.values_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn receive_errors(&self) -> u64 {
        self.receive_errors.load(Ordering::Relaxed)
    }

    pub fn inc_receive_errors(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received(),
            applied: self.applied(),
            decode_failures: self.decode_failures(),
            values_written: self.values_written(),
            receive_errors: self.receive_errors(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub applied: u64,
    pub decode_failures: u64,
    pub values_written: u64,
    pub receive_errors: u64,
}
