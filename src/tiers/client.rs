//! Persisted-Client Tier
//!
//! Best-effort secondary cache modeling the small key/value storage held
//! by the requesting client. Everything crosses a serialization
//! boundary and lives under a byte budget of a few KB, so writes may be
//! silently skipped and corrupt records are treated as misses. The tier
//! never surfaces an error.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::CacheEntry;
use crate::error::{TierError, TierResult};
use crate::tiers::Tier;

const TIER_NAME: &str = "client";

// == Client Tier ==
/// Size-constrained serialized store.
pub struct ClientTier {
    records: RwLock<HashMap<String, String>>,
    max_value_bytes: usize,
    max_total_bytes: usize,
}

impl ClientTier {
    // == Constructor ==
    /// Creates a client tier with the given byte budgets.
    ///
    /// # Arguments
    /// * `max_value_bytes` - Cap on a single serialized record
    /// * `max_total_bytes` - Cap on the sum of all serialized records
    pub fn new(max_value_bytes: usize, max_total_bytes: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            max_value_bytes,
            max_total_bytes,
        }
    }

    /// Serializes an entry and enforces the byte budgets.
    async fn try_store(&self, key: &str, entry: &CacheEntry) -> TierResult<()> {
        let serialized = serde_json::to_string(entry)
            .map_err(|e| TierError::serialization(TIER_NAME, key, e.to_string()))?;

        if serialized.len() > self.max_value_bytes {
            return Err(TierError::serialization(
                TIER_NAME,
                key,
                format!(
                    "serialized value of {} bytes exceeds per-value cap of {}",
                    serialized.len(),
                    self.max_value_bytes
                ),
            ));
        }

        let mut records = self.records.write().await;
        let occupied: usize = records
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum();
        if occupied + serialized.len() > self.max_total_bytes {
            return Err(TierError::serialization(
                TIER_NAME,
                key,
                format!("storage quota of {} bytes exceeded", self.max_total_bytes),
            ));
        }

        records.insert(key.to_string(), serialized);
        Ok(())
    }
}

#[async_trait]
impl Tier for ClientTier {
    fn name(&self) -> &'static str {
        TIER_NAME
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let serialized = {
            let records = self.records.read().await;
            records.get(key)?.clone()
        };

        let parsed: Result<CacheEntry, _> = serde_json::from_str(&serialized);
        match parsed {
            Ok(entry) if entry.is_live(current_timestamp_ms()) => Some(entry),
            Ok(_) => {
                // Expired record, drop it lazily
                self.records.write().await.remove(key);
                None
            }
            Err(e) => {
                // Corrupt stored data is a miss, never an error
                debug!(key, error = %e, "client tier dropped corrupt record");
                self.records.write().await.remove(key);
                None
            }
        }
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        if let Err(e) = self.try_store(key, &entry).await {
            // Oversized or over-quota payloads are skipped at this tier
            debug!(key, error = %e, "client tier skipped write");
        }
    }

    async fn delete(&self, keys: &[String]) -> usize {
        let mut records = self.records.write().await;
        keys.iter()
            .filter(|key| records.remove(key.as_str()).is_some())
            .count()
    }

    async fn keys(&self) -> Vec<String> {
        let records = self.records.read().await;
        records.keys().cloned().collect()
    }
}
