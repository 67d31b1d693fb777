//! Invalidation Engine
//!
//! Translates a logical invalidation request into concrete per-tier
//! deletions plus tag-index maintenance. Deletions fan out to all tiers
//! concurrently, and a call resolves only once every tier has
//! acknowledged, so a caller awaiting it can trust the key is gone
//! everywhere.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{StatsCounters, TagIndex};
use crate::tiers::Tier;

// == Invalidation Engine ==
/// Executes exact-key, tag-based, and glob-pattern-based invalidation
/// across all tiers.
pub struct InvalidationEngine {
    /// All tiers, authoritative memory tier first
    tiers: Vec<Arc<dyn Tier>>,
    tag_index: Arc<RwLock<TagIndex>>,
    stats: Arc<StatsCounters>,
}

impl InvalidationEngine {
    // == Constructor ==
    pub fn new(
        tiers: Vec<Arc<dyn Tier>>,
        tag_index: Arc<RwLock<TagIndex>>,
        stats: Arc<StatsCounters>,
    ) -> Self {
        Self {
            tiers,
            tag_index,
            stats,
        }
    }

    // == Invalidate Key ==
    /// Deletes a single key from every tier and the tag index.
    ///
    /// Idempotent: invalidating an absent key is a no-op.
    pub async fn invalidate(&self, key: &str) -> usize {
        let keys = [key.to_string()];
        self.invalidate_keys(&keys).await
    }

    // == Invalidate By Tags ==
    /// Resolves all keys under any of the given tags and invalidates
    /// each. Tags with zero matches are skipped; an empty tag list is a
    /// no-op.
    ///
    /// # Returns
    /// The number of keys resolved and invalidated.
    pub async fn invalidate_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> usize {
        if tags.is_empty() {
            return 0;
        }

        let keys: Vec<String> = {
            let index = self.tag_index.read().await;
            index.keys_for_tags(tags).into_iter().collect()
        };

        let count = self.invalidate_keys(&keys).await;
        debug!(count, "tag invalidation completed");
        count
    }

    // == Invalidate By Pattern ==
    /// Enumerates stored keys in every tier, selects those whose full
    /// name matches the glob (`*` = any run of characters, rest
    /// literal, case-sensitive), and invalidates each match. An empty
    /// pattern is a no-op.
    ///
    /// This is the expensive path: it scans each tier's keyspace. Tag
    /// invalidation stays proportional to the affected keys and is the
    /// preferred mechanism when content can be classified up front.
    ///
    /// # Returns
    /// The number of keys resolved and invalidated.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        if pattern.is_empty() {
            return 0;
        }

        // Union across tiers: a key may live only in the shared tier
        let per_tier = join_all(
            self.tiers
                .iter()
                .map(|tier| tier.keys_matching(pattern)),
        )
        .await;

        let mut matched: HashSet<String> = HashSet::new();
        for keys in per_tier {
            matched.extend(keys);
        }

        let keys: Vec<String> = matched.into_iter().collect();
        let count = self.invalidate_keys(&keys).await;
        debug!(pattern, count, "pattern invalidation completed");
        count
    }

    /// Shared deletion path: strip the tag index, then fan the
    /// deletions out to every tier and wait for all of them.
    async fn invalidate_keys(&self, keys: &[String]) -> usize {
        if keys.is_empty() {
            return 0;
        }

        {
            let mut index = self.tag_index.write().await;
            for key in keys {
                index.remove(key);
            }
        }

        let removed = join_all(self.tiers.iter().map(|tier| tier.delete(keys))).await;

        // Evictions are counted against the authoritative memory tier
        // (always first); summing tiers would count each key multiple
        // times.
        let evicted = removed.first().copied().unwrap_or(0);
        self.stats.record_evictions(evicted as u64);

        keys.len()
    }
}
