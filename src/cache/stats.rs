//! Cache Statistics Module
//!
//! Tracks fetch outcomes and eviction activity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Fetches served from the object store
    pub hits: u64,
    /// Fetches that invoked the producer
    pub misses: u64,
    /// Producer invocations that returned an error
    pub producer_errors: u64,
    /// Fetches refused because the eviction worker was stopped
    pub rejected: u64,
    /// Entries removed by the worker after expiring
    pub expired_evictions: u64,
    /// Shield tokens removed by the worker after going idle
    pub shield_evictions: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if nothing was fetched yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by fetch callers and the eviction worker.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    producer_errors: AtomicU64,
    rejected: AtomicU64,
    expired_evictions: AtomicU64,
    shield_evictions: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_producer_error(&self) {
        self.producer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self, expired: usize, shields: usize) {
        self.expired_evictions
            .fetch_add(expired as u64, Ordering::Relaxed);
        self.shield_evictions
            .fetch_add(shields as u64, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter. Counters are read independently.
    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            producer_errors: self.producer_errors.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            expired_evictions: self.expired_evictions.load(Ordering::Relaxed),
            shield_evictions: self.shield_evictions.load(Ordering::Relaxed),
        }
    }
}
