//! Memory Tier
//!
//! Fastest, process-local storage; the authoritative tier for TTL
//! enforcement and for the derived entry count reported by statistics.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, StatsCounters};
use crate::tiers::Tier;

// == Memory Tier ==
/// Process-local map with expiry metadata.
///
/// Unbounded: growth is held down by lazy eviction at read time and the
/// periodic sweep, not by a capacity limit. Never fails for ordinary
/// operations.
pub struct MemoryTier {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: Arc<StatsCounters>,
}

impl MemoryTier {
    // == Constructor ==
    /// Creates an empty memory tier sharing the given counters.
    pub fn new(stats: Arc<StatsCounters>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats,
        }
    }

    // == Live Length ==
    /// Counts currently-live entries, skipping not-yet-swept expired ones.
    pub async fn len_live(&self) -> usize {
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.is_live(now)).count()
    }

    // == Sweep Expired ==
    /// Removes all expired entries and returns their keys so the caller
    /// can clean the tag index. Each removal counts as an eviction.
    pub async fn sweep_expired(&self) -> Vec<String> {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;

        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.remove(key);
        }
        self.stats.record_evictions(expired.len() as u64);

        expired
    }
}

#[async_trait]
impl Tier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = current_timestamp_ms();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it lazily under the write lock. Re-check the
        // entry in case a concurrent set refreshed the key in between.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.is_live(current_timestamp_ms()) {
                return Some(entry.clone());
            }
            entries.remove(key);
            self.stats.record_evictions(1);
        }
        None
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }

    async fn delete(&self, keys: &[String]) -> usize {
        let mut entries = self.entries.write().await;
        keys.iter()
            .filter(|key| entries.remove(key.as_str()).is_some())
            .count()
    }

    async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        entries.keys().cloned().collect()
    }
}
