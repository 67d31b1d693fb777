//! Shared Tier
//!
//! Optional Redis-backed tier giving every process a common view of the
//! cache. Entries are stored as JSON with a server-side expiry so the
//! backend evicts on its own. Every call carries an internal deadline;
//! a slow or unreachable backend degrades to a miss or a skipped write,
//! logged but never surfaced.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::time::timeout;
use tracing::warn;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::CacheEntry;
use crate::error::{TierError, TierResult};
use crate::tiers::Tier;

const TIER_NAME: &str = "shared";

/// Namespace prefix for every key this tier writes, so invalidation
/// scans never touch unrelated data in the same backend.
const KEY_PREFIX: &str = "tiercache:";

/// Deadline for the initial connection handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

// == Shared Tier ==
/// External networked key/value store, available to all processes.
pub struct SharedTier {
    connection: MultiplexedConnection,
    op_timeout: Duration,
}

impl SharedTier {
    // == Connect ==
    /// Connects to the backend at `url`.
    ///
    /// # Arguments
    /// * `url` - e.g. `redis://localhost:6379`
    /// * `op_timeout` - Per-operation deadline applied to every call
    ///
    /// # Returns
    /// * `Ok(SharedTier)` - Successfully connected tier
    /// * `Err(TierError)` - Connection failed; the caller runs without
    ///   this tier
    pub async fn connect(url: &str, op_timeout: Duration) -> TierResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| TierError::unavailable(TIER_NAME, e.to_string()))?;

        let connection = timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| TierError::Timeout {
                tier: TIER_NAME,
                timeout: CONNECT_TIMEOUT,
            })?
            .map_err(|e| TierError::unavailable(TIER_NAME, e.to_string()))?;

        Ok(Self {
            connection,
            op_timeout,
        })
    }

    /// Wraps a backend call in the per-operation deadline.
    async fn bounded<T, F>(&self, op: F) -> TierResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.op_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TierError::unavailable(TIER_NAME, e.to_string())),
            Err(_) => Err(TierError::Timeout {
                tier: TIER_NAME,
                timeout: self.op_timeout,
            }),
        }
    }

    async fn try_get(&self, key: &str) -> TierResult<Option<CacheEntry>> {
        let full_key = prefixed(key);
        let mut conn = self.connection.clone();

        let raw: Option<String> = self.bounded(conn.get(&full_key)).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&raw)
            .map_err(|e| TierError::serialization(TIER_NAME, key, e.to_string()))?;

        if !entry.is_live(current_timestamp_ms()) {
            // The backend keeps wall-clock expiry too, but clocks can
            // drift; drop the straggler in the background.
            let mut del_conn = self.connection.clone();
            tokio::spawn(async move {
                let _: redis::RedisResult<()> = del_conn.del(full_key).await;
            });
            return Ok(None);
        }

        Ok(Some(entry))
    }

    async fn try_set(&self, key: &str, entry: &CacheEntry) -> TierResult<()> {
        let remaining_ms = entry.expires_at.saturating_sub(current_timestamp_ms());
        if remaining_ms == 0 {
            // Already dead on arrival, nothing worth shipping
            return Ok(());
        }

        let serialized = serde_json::to_string(entry)
            .map_err(|e| TierError::serialization(TIER_NAME, key, e.to_string()))?;

        let full_key = prefixed(key);
        let mut conn = self.connection.clone();
        self.bounded(conn.pset_ex::<_, _, ()>(&full_key, serialized, remaining_ms))
            .await
    }

    async fn try_delete(&self, keys: &[String]) -> TierResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let full_keys: Vec<String> = keys.iter().map(|k| prefixed(k)).collect();
        let mut conn = self.connection.clone();
        let removed: usize = self.bounded(conn.del(&full_keys)).await?;
        Ok(removed)
    }

    /// Enumerates keys server-side with a SCAN MATCH expression already
    /// carrying the namespace prefix.
    async fn try_scan(&self, match_expr: &str) -> TierResult<Vec<String>> {
        let mut conn = self.connection.clone();

        let scan = async {
            let mut iter = conn.scan_match::<_, String>(match_expr).await?;
            let mut found = Vec::new();
            while let Some(full_key) = iter.next_item().await {
                if let Some(key) = full_key.strip_prefix(KEY_PREFIX) {
                    found.push(key.to_string());
                }
            }
            Ok::<_, redis::RedisError>(found)
        };

        self.bounded(scan).await
    }
}

#[async_trait]
impl Tier for SharedTier {
    fn name(&self) -> &'static str {
        TIER_NAME
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        match self.try_get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "shared tier read degraded to miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        if let Err(e) = self.try_set(key, &entry).await {
            warn!(key, error = %e, "shared tier write skipped");
        }
    }

    async fn delete(&self, keys: &[String]) -> usize {
        match self.try_delete(keys).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "shared tier delete skipped");
                0
            }
        }
    }

    async fn keys(&self) -> Vec<String> {
        match self.try_scan(&format!("{KEY_PREFIX}*")).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "shared tier enumeration skipped");
                Vec::new()
            }
        }
    }

    async fn keys_matching(&self, pattern: &str) -> Vec<String> {
        // Native server-side matching; the backend understands `*` the
        // same way, its extra metacharacters are escaped away.
        let match_expr = format!("{KEY_PREFIX}{}", escape_backend_glob(pattern));
        match self.try_scan(&match_expr).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern, error = %e, "shared tier pattern enumeration skipped");
                Vec::new()
            }
        }
    }
}

// == Glob Escaping ==
/// Escapes the backend's extra glob metacharacters (`?`, `[`, `]`, `\`)
/// so only `*` keeps special meaning, matching the local matcher.
fn escape_backend_glob(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn prefixed(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}
