//! tiercache - Tiered read-through cache with tag and glob invalidation
//!
//! Fronts read-heavy queries with time-bounded cached values across
//! three storage tiers (process memory, a size-constrained
//! client-persisted store, and an optional shared backend), with
//! tag-based and glob-pattern-based bulk invalidation, running hit/miss
//! statistics, and outbound HTTP caching directives derived from named
//! profiles.
//!
//! # Example
//!
//! ```ignore
//! use tiercache::{CacheValue, Config, UnifiedCache};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = UnifiedCache::new(&Config::from_env()).await;
//!
//!     // Read-through: the closure runs only on a full miss
//!     let events = cache
//!         .get_or_fetch("events:upcoming", Some(60.0), &["events", "content"], || async {
//!             Ok::<_, std::convert::Infallible>(CacheValue::json(json!(["launch-party"])))
//!         })
//!         .await
//!         .unwrap();
//!
//!     // An event changed: drop everything tagged with it
//!     cache.invalidate_by_tags(&["events"]).await;
//!
//!     cache.shutdown();
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod tasks;
pub mod tiers;

pub use cache::{CacheEntry, CacheValue, StatsSnapshot, UnifiedCache};
pub use config::Config;
pub use http::{profile, CacheProfile, CachedResponse, API_STANDARD, DATABASE_QUERIES, USER_PRIVATE};
pub use tiers::{ClientTier, MemoryTier, SharedTier, Tier};
