//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, sets, and
//! evictions. Counters are atomics so the facade, the tiers, and the
//! background sweep can share them without a lock.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Running counters for the process lifetime.
///
/// All counters increase monotonically and are reset only by an explicit
/// `reset()`. The current entry count is not tracked here; it is derived
/// on demand from the authoritative memory tier.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    evictions: AtomicU64,
}

impl StatsCounters {
    // == Constructor ==
    /// Creates new counters, all at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Set ==
    /// Increments the set counter (refreshes included).
    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Evictions ==
    /// Adds to the eviction counter.
    pub fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evictions.fetch_add(count, Ordering::Relaxed);
        }
    }

    // == Reset ==
    /// Zeroes all counters.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.sets.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Captures the counters together with the derived entry count.
    ///
    /// # Arguments
    /// * `size` - Count of currently-live entries in the memory tier
    pub fn snapshot(&self, size: usize) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        StatsSnapshot {
            hits,
            misses,
            sets: self.sets.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size,
            hit_rate: hit_rate(hits, misses),
            collected_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// hits / (hits + misses), or 0.0 before any request.
fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the counters, for diagnostics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Number of reads served from a tier
    pub hits: u64,
    /// Number of reads where every tier missed
    pub misses: u64,
    /// Number of set calls, refreshes included
    pub sets: u64,
    /// Expired entries discovered plus explicit deletions
    pub evictions: u64,
    /// Live entries in the memory tier at snapshot time
    pub size: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Snapshot timestamp in ISO 8601 format
    pub collected_at: String,
}
