//! Unified Cache Facade
//!
//! The single public entry point over the tier stack: read-through
//! `get`/`get_or_fetch`, write-through `set`, bulk invalidation, running
//! statistics, and outbound HTTP response shaping.
//!
//! The facade is an explicit context object constructed once at process
//! start and handed to request handlers; there is no global state. Call
//! `shutdown` during teardown to stop the background sweep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEntry, CacheValue, InvalidationEngine, StatsCounters, StatsSnapshot, TagIndex,
};
use crate::config::Config;
use crate::http::{CacheProfile, CachedResponse};
use crate::tasks::spawn_sweep_task;
use crate::tiers::{ClientTier, MemoryTier, SharedTier, Tier};

// == Unified Cache ==
/// Orchestrates the tier stack, tag index and statistics.
///
/// Tiers are consulted in fixed preference order: memory, then the
/// persisted-client tier, then the shared tier when configured. The
/// first live hit wins and is back-filled into the faster tiers that
/// missed.
pub struct UnifiedCache {
    /// All available tiers, fastest first; memory is always present
    tiers: Vec<Arc<dyn Tier>>,
    memory: Arc<MemoryTier>,
    tag_index: Arc<RwLock<TagIndex>>,
    stats: Arc<StatsCounters>,
    invalidation: InvalidationEngine,
    default_ttl: f64,
    sweep: JoinHandle<()>,
}

impl UnifiedCache {
    // == Constructor ==
    /// Builds the cache from configuration.
    ///
    /// The shared tier is attached only when `shared_cache_url` is set
    /// and the connection succeeds; a failed connection is logged and
    /// the cache runs on the first two tiers.
    pub async fn new(config: &Config) -> Self {
        let stats = Arc::new(StatsCounters::new());
        let memory = Arc::new(MemoryTier::new(stats.clone()));
        let client = Arc::new(ClientTier::new(
            config.client_max_value_bytes,
            config.client_max_total_bytes,
        ));

        let shared: Option<Arc<dyn Tier>> = match &config.shared_cache_url {
            Some(url) => {
                let op_timeout = Duration::from_millis(config.shared_timeout_ms);
                match SharedTier::connect(url, op_timeout).await {
                    Ok(tier) => {
                        info!("shared tier connected");
                        Some(Arc::new(tier))
                    }
                    Err(e) => {
                        warn!(error = %e, "shared tier unavailable, continuing without it");
                        None
                    }
                }
            }
            None => None,
        };

        let tiers: Vec<Arc<dyn Tier>> = [
            Some(memory.clone() as Arc<dyn Tier>),
            Some(client as Arc<dyn Tier>),
            shared,
        ]
        .into_iter()
        .flatten()
        .collect();

        let tag_index = Arc::new(RwLock::new(TagIndex::new()));
        let invalidation =
            InvalidationEngine::new(tiers.clone(), tag_index.clone(), stats.clone());
        let sweep = spawn_sweep_task(memory.clone(), tag_index.clone(), config.sweep_interval);

        Self {
            tiers,
            memory,
            tag_index,
            stats,
            invalidation,
            default_ttl: config.default_ttl,
            sweep,
        }
    }

    // == Get ==
    /// Returns the cached value for `key`, or `None` on a full miss.
    ///
    /// `None` covers both "never set" and "expired"; callers cannot
    /// tell the two apart here. A hit found in a slower tier is
    /// promoted into the faster tiers in the background, without
    /// delaying this call's return.
    pub async fn get(&self, key: &str) -> Option<CacheValue> {
        for (depth, tier) in self.tiers.iter().enumerate() {
            if let Some(entry) = tier.get(key).await {
                self.stats.record_hit();
                if depth > 0 {
                    debug!(key, tier = tier.name(), "hit in slower tier, promoting");
                    self.backfill(key, &entry, depth);
                }
                return Some(entry.value);
            }
        }

        self.stats.record_miss();
        None
    }

    // == Get Or Fetch ==
    /// Read-through get: on a full miss, runs the caller's fetch
    /// closure, stores the result in all tiers, and returns it.
    ///
    /// A fetch failure propagates unchanged and nothing is cached; the
    /// cache never converts its own degradation into an error.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl_seconds: Option<f64>,
        tags: &[&str],
        fetch: F,
    ) -> Result<CacheValue, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheValue, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.set(key, value.clone(), ttl_seconds, tags).await;
        Ok(value)
    }

    // == Set ==
    /// Stores a value in all available tiers with the given TTL and
    /// tags, refreshing any previous entry under the key (old tag
    /// associations are dropped first).
    ///
    /// # Arguments
    /// * `key` - Caller-chosen cache key
    /// * `value` - Payload; `CacheValue::Absent` and explicit null are
    ///   both legal and round-trip distinctly
    /// * `ttl_seconds` - TTL in seconds (uses the configured default
    ///   when `None`); `0.0` and sub-second values expire immediately
    /// * `tags` - Tags for bulk invalidation; may be empty
    pub async fn set(&self, key: &str, value: CacheValue, ttl_seconds: Option<f64>, tags: &[&str]) {
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, ttl, tags);

        {
            let mut index = self.tag_index.write().await;
            index.associate(key, &entry.tags);
        }

        // Client and shared writes are best-effort; the tiers swallow
        // their own failures.
        join_all(
            self.tiers
                .iter()
                .map(|tier| tier.set(key, entry.clone())),
        )
        .await;

        self.stats.record_set();
    }

    // == Invalidate ==
    /// Deletes a single key from every tier. Idempotent.
    pub async fn invalidate(&self, key: &str) -> usize {
        self.invalidation.invalidate(key).await
    }

    /// Deletes every key carrying any of the given tags. Unknown tags
    /// and an empty list are no-ops.
    pub async fn invalidate_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> usize {
        self.invalidation.invalidate_by_tags(tags).await
    }

    /// Deletes every key whose full name matches the glob pattern.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        self.invalidation.invalidate_pattern(pattern).await
    }

    // == Stats ==
    /// Captures current statistics; `size` is computed on demand from
    /// the memory tier.
    pub async fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.memory.len_live().await)
    }

    /// Zeroes the running counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    // == Create Response ==
    /// Shapes an outbound response: the JSON payload plus the caching
    /// directives of the named profile.
    ///
    /// Performs no cache reads or writes; internal freshness (TTL) and
    /// downstream cache treatment (HTTP directives) are independent
    /// concerns that only share configuration profiles.
    pub fn create_response<T: Serialize>(
        &self,
        payload: T,
        profile: &'static CacheProfile,
    ) -> CachedResponse<T> {
        CachedResponse::new(payload, profile)
    }

    // == Shutdown ==
    /// Stops the background sweep. Tier connections drop with the
    /// context object itself.
    pub fn shutdown(&self) {
        self.sweep.abort();
        info!("cache shut down");
    }

    /// Promotes a hit from `self.tiers[depth]` into all faster tiers,
    /// fire-and-forget so the read path never waits on a slow write.
    fn backfill(&self, key: &str, entry: &CacheEntry, depth: usize) {
        let faster: Vec<Arc<dyn Tier>> = self.tiers[..depth].to_vec();
        let key = key.to_string();
        let entry = entry.clone();

        tokio::spawn(async move {
            for tier in faster {
                tier.set(&key, entry.clone()).await;
                debug!(key, tier = tier.name(), "back-filled faster tier");
            }
        });
    }
}
