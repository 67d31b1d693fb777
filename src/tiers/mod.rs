//! Tier Backends
//!
//! The three storage backends participating in the cache, behind one
//! soft-fail trait. Tiers are consulted in preference order memory ->
//! client -> shared; each one owns its own synchronization and its own
//! failure handling.

mod client;
mod memory;
mod shared;

pub use client::ClientTier;
pub use memory::MemoryTier;
pub use shared::SharedTier;

use async_trait::async_trait;

use crate::cache::glob::glob_match;
use crate::cache::CacheEntry;

// == Tier Trait ==
/// A tier is one physical storage backend participating in the cache.
///
/// The trait boundary is deliberately infallible: tiers model failures
/// internally (unreachable backend, serialization overflow, corrupt
/// data, timeouts) and collapse them to a miss on read or a no-op on
/// write, so the facade's control flow never branches on tier-specific
/// errors.
#[async_trait]
pub trait Tier: Send + Sync {
    /// A name for logs.
    ///
    /// # Example
    /// - "memory"
    /// - "client"
    /// - "shared"
    fn name(&self) -> &'static str;

    /// Returns the live entry for the key, or `None` on miss, expiry, or
    /// any internal tier failure. Expired entries must never be
    /// returned; dropping them lazily at read time is the tier's choice.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores the entry, unconditionally overwriting. Best-effort:
    /// failures are swallowed and logged by the tier.
    async fn set(&self, key: &str, entry: CacheEntry);

    /// Removes the given keys. Idempotent; deleting an absent key is not
    /// an error. Returns how many stored entries were actually removed.
    async fn delete(&self, keys: &[String]) -> usize;

    /// Returns the currently-stored keys. Not-yet-swept expired keys may
    /// appear; callers re-check liveness before trusting a key.
    async fn keys(&self) -> Vec<String>;

    /// Returns stored keys whose full name matches the glob pattern.
    ///
    /// The default enumerates locally and filters; backends with native
    /// pattern enumeration override this.
    async fn keys_matching(&self, pattern: &str) -> Vec<String> {
        self.keys()
            .await
            .into_iter()
            .filter(|key| glob_match(pattern, key))
            .collect()
    }
}
