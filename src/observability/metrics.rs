//! Metrics registry for bracketstack
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all operational counters
///
/// Shared between the consumer task and whoever reports on it, so every
/// counter is atomic. Relaxed ordering is enough for counters.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Bytes received from the feed
    bytes_received: AtomicU64,
    /// Bytes that were not brackets
    bytes_ignored: AtomicU64,
    /// Opening brackets pushed
    pushes: AtomicU64,
    /// Closing brackets processed
    pops: AtomicU64,
    /// Valid verdicts
    valid_streams: AtomicU64,
    /// Invalid verdicts
    invalid_streams: AtomicU64,
    /// Batches fully drained
    batches_drained: AtomicU64,
    /// Storage failures
    storage_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment bytes received
    pub fn increment_bytes_received(&self) {
        self.bytes_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment ignored bytes
    pub fn increment_bytes_ignored(&self) {
        self.bytes_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment pushes
    pub fn increment_pushes(&self) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment pops
    pub fn increment_pops(&self) {
        self.pops.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment valid verdicts
    pub fn increment_valid(&self) {
        self.valid_streams.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment invalid verdicts
    pub fn increment_invalid(&self) {
        self.invalid_streams.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment drained batches
    pub fn increment_batches_drained(&self) {
        self.batches_drained.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment storage failures
    pub fn increment_storage_failures(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get bytes received
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_ignored: self.bytes_ignored.load(Ordering::Relaxed),
            pushes: self.pushes.load(Ordering::Relaxed),
            pops: self.pops.load(Ordering::Relaxed),
            valid_streams: self.valid_streams.load(Ordering::Relaxed),
            invalid_streams: self.invalid_streams.load(Ordering::Relaxed),
            batches_drained: self.batches_drained.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub bytes_received: u64,
    pub bytes_ignored: u64,
    pub pushes: u64,
    pub pops: u64,
    pub valid_streams: u64,
    pub invalid_streams: u64,
    pub batches_drained: u64,
    pub storage_failures: u64,
}
