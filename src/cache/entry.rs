//! Cache Entry Module
//!
//! Defines the value envelope stored by every tier: payload, creation
//! time, expiry and tag set.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Value ==
/// Payload of a cache entry.
///
/// The platform caches arbitrary serializable values, including an
/// explicit "no value" marker that is distinct from JSON null:
/// - `Json(Value::Null)` is stored and returned as null
/// - `Absent` is stored and returned as absent
///
/// "Key not present" is expressed as `Option::None` at the read path and
/// is deliberately not a `CacheValue` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CacheValue {
    /// Stored "no value" marker
    Absent,
    /// Any JSON payload, including explicit null
    Json(Value),
}

impl CacheValue {
    /// Wraps any JSON-convertible payload.
    pub fn json(value: impl Into<Value>) -> Self {
        CacheValue::Json(value.into())
    }

    /// Explicit null payload.
    pub fn null() -> Self {
        CacheValue::Json(Value::Null)
    }

    /// Returns true for the stored "no value" marker.
    pub fn is_absent(&self) -> bool {
        matches!(self, CacheValue::Absent)
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        CacheValue::Json(value)
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Serializable as a whole so the client and shared tiers can round-trip
/// entries as JSON without losing tags or expiry metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub value: CacheValue,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Tags carried by this entry, duplicates collapsed
    pub tags: HashSet<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_seconds` from now.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_seconds` - Non-negative TTL in seconds; `0.0` and
    ///   sub-second values are legal and expire almost immediately
    /// * `tags` - Tags to attach; duplicates are collapsed
    pub fn new(value: CacheValue, ttl_seconds: f64, tags: &[&str]) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = (ttl_seconds.max(0.0) * 1000.0).round() as u64;

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    // == Is Live ==
    /// Checks whether the entry is live at the given instant.
    ///
    /// Boundary condition: an entry is live strictly before its
    /// expiration time. Once the current time reaches `expires_at` the
    /// entry must never be returned again, purged or not.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at
    }

    // == Is Expired ==
    /// Checks the entry against the current clock.
    pub fn is_expired(&self) -> bool {
        !self.is_live(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
