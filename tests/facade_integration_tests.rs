//! Integration Tests for the Unified Cache
//!
//! Exercises the full facade: read-through flow, TTL expiry, tag and
//! pattern invalidation, the tri-state payload model, statistics, and
//! outbound response shaping.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use tiercache::{profile, CacheValue, Config, UnifiedCache, API_STANDARD, USER_PRIVATE};

// == Helper Functions ==

fn test_config() -> Config {
    Config {
        sweep_interval: 3600,
        ..Config::default()
    }
}

async fn create_cache() -> UnifiedCache {
    // A subscriber helps when debugging failures; ignore double-init
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiercache=warn".into()),
        )
        .try_init();

    UnifiedCache::new(&test_config()).await
}

// == TTL Correctness ==

#[tokio::test]
async fn test_value_is_returned_while_live() {
    let cache = create_cache().await;

    cache
        .set("k", CacheValue::json(json!({"a": 1})), Some(60.0), &[])
        .await;

    assert_eq!(
        cache.get("k").await,
        Some(CacheValue::json(json!({"a": 1})))
    );
    cache.shutdown();
}

#[tokio::test]
async fn test_subsecond_ttl_expires() {
    let cache = create_cache().await;

    cache
        .set("k", CacheValue::json(json!({"a": 1})), Some(0.001), &[])
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(cache.get("k").await, None);
    cache.shutdown();
}

#[tokio::test]
async fn test_expired_key_can_be_set_again() {
    let cache = create_cache().await;

    cache
        .set("k", CacheValue::json(json!(1)), Some(0.001), &[])
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(cache.get("k").await.is_none());

    cache
        .set("k", CacheValue::json(json!(2)), Some(60.0), &[])
        .await;
    assert_eq!(cache.get("k").await, Some(CacheValue::json(json!(2))));
    cache.shutdown();
}

// == Tag Invalidation ==

#[tokio::test]
async fn test_tag_invalidation_completeness() {
    let cache = create_cache().await;

    cache
        .set("e1", CacheValue::json(json!("v")), Some(60.0), &["events"])
        .await;
    cache
        .set(
            "e2",
            CacheValue::json(json!("v")),
            Some(60.0),
            &["events", "content"],
        )
        .await;
    cache
        .set("u1", CacheValue::json(json!("v")), Some(60.0), &["other"])
        .await;

    let count = cache.invalidate_by_tags(&["events"]).await;

    assert_eq!(count, 2);
    assert_eq!(cache.get("e1").await, None);
    assert_eq!(cache.get("e2").await, None);
    assert_eq!(cache.get("u1").await, Some(CacheValue::json(json!("v"))));
    cache.shutdown();
}

#[tokio::test]
async fn test_invalidating_unknown_tag_is_noop() {
    let cache = create_cache().await;

    cache
        .set("k", CacheValue::json(json!(1)), Some(60.0), &["kept"])
        .await;

    assert_eq!(cache.invalidate_by_tags(&["never-used"]).await, 0);
    assert!(cache.get("k").await.is_some());
    cache.shutdown();
}

// == Pattern Invalidation ==

#[tokio::test]
async fn test_pattern_invalidation_scoping() {
    let cache = create_cache().await;

    for key in ["events:1", "events:2", "events:featured:1", "users:1"] {
        cache
            .set(key, CacheValue::json(json!(key)), Some(60.0), &[])
            .await;
    }

    let count = cache.invalidate_pattern("events:*").await;

    assert_eq!(count, 3);
    assert_eq!(cache.get("events:1").await, None);
    assert_eq!(cache.get("events:2").await, None);
    assert_eq!(cache.get("events:featured:1").await, None);
    assert_eq!(
        cache.get("users:1").await,
        Some(CacheValue::json(json!("users:1")))
    );
    cache.shutdown();
}

#[tokio::test]
async fn test_pattern_is_anchored_to_full_key() {
    let cache = create_cache().await;

    cache
        .set("all-events:1", CacheValue::json(json!(1)), Some(60.0), &[])
        .await;

    // "events:*" must not match as a substring
    assert_eq!(cache.invalidate_pattern("events:*").await, 0);
    assert!(cache.get("all-events:1").await.is_some());
    cache.shutdown();
}

// == Explicit Invalidation ==

#[tokio::test]
async fn test_invalidate_is_idempotent() {
    let cache = create_cache().await;

    cache
        .set("k", CacheValue::json(json!(1)), Some(60.0), &[])
        .await;

    cache.invalidate("k").await;
    // Second call is a harmless no-op
    cache.invalidate("k").await;

    assert_eq!(cache.get("k").await, None);
    cache.shutdown();
}

// == Payload Tri-State ==

#[tokio::test]
async fn test_null_is_present_but_null() {
    let cache = create_cache().await;

    cache.set("k", CacheValue::null(), Some(60.0), &[]).await;

    assert_eq!(cache.get("k").await, Some(CacheValue::json(Value::Null)));
    cache.shutdown();
}

#[tokio::test]
async fn test_absent_marker_roundtrips_distinct_from_null() {
    let cache = create_cache().await;

    cache.set("k", CacheValue::Absent, Some(60.0), &[]).await;

    let value = cache.get("k").await.unwrap();
    assert!(value.is_absent());
    assert_ne!(value, CacheValue::null());
    cache.shutdown();
}

#[tokio::test]
async fn test_never_set_key_reads_as_none() {
    let cache = create_cache().await;
    assert_eq!(cache.get("never-set").await, None);
    cache.shutdown();
}

// == Read-Through ==

#[tokio::test]
async fn test_get_or_fetch_caches_on_miss() {
    let cache = create_cache().await;
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
        let value: Result<_, std::convert::Infallible> = cache
            .get_or_fetch("events:list", Some(60.0), &["events"], || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CacheValue::json(json!([{"id": 1}])))
            })
            .await;
        assert_eq!(value.unwrap(), CacheValue::json(json!([{"id": 1}])));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    cache.shutdown();
}

#[tokio::test]
async fn test_fetch_failure_propagates_and_caches_nothing() {
    let cache = create_cache().await;

    let result: Result<CacheValue, String> = cache
        .get_or_fetch("k", Some(60.0), &[], || async {
            Err("query timed out".to_string())
        })
        .await;

    assert_eq!(result.unwrap_err(), "query timed out");
    assert_eq!(cache.get("k").await, None);

    // The failed fetch left the key cold; a later fetch runs again
    let result: Result<CacheValue, String> = cache
        .get_or_fetch("k", Some(60.0), &[], || async {
            Ok(CacheValue::json(json!("recovered")))
        })
        .await;
    assert_eq!(result.unwrap(), CacheValue::json(json!("recovered")));
    cache.shutdown();
}

// == Statistics ==

#[tokio::test]
async fn test_cold_reads_count_only_misses() {
    let cache = create_cache().await;

    for i in 0..10 {
        assert!(cache.get(&format!("cold:{i}")).await.is_none());
    }

    let stats = cache.stats().await;
    assert_eq!(stats.misses, 10);
    assert_eq!(stats.hits, 0);
    cache.shutdown();
}

#[tokio::test]
async fn test_hit_increments_only_hits() {
    let cache = create_cache().await;

    cache
        .set("k", CacheValue::json(json!(1)), Some(60.0), &[])
        .await;
    let before = cache.stats().await;

    assert!(cache.get("k").await.is_some());

    let after = cache.stats().await;
    assert_eq!(after.hits, before.hits + 1);
    assert_eq!(after.misses, before.misses);
    cache.shutdown();
}

#[tokio::test]
async fn test_size_reflects_live_entries_only() {
    let cache = create_cache().await;

    cache
        .set("live", CacheValue::json(json!(1)), Some(60.0), &[])
        .await;
    cache
        .set("dying", CacheValue::json(json!(2)), Some(0.001), &[])
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let stats = cache.stats().await;
    assert_eq!(stats.size, 1);
    assert_eq!(stats.sets, 2);
    cache.shutdown();
}

#[tokio::test]
async fn test_evictions_count_expiry_and_invalidation() {
    let cache = create_cache().await;

    cache
        .set("expiring", CacheValue::json(json!(1)), Some(0.001), &[])
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let _ = cache.get("expiring").await; // lazily discovered expiry

    cache
        .set("removed", CacheValue::json(json!(2)), Some(60.0), &[])
        .await;
    cache.invalidate("removed").await;

    let stats = cache.stats().await;
    assert_eq!(stats.evictions, 2);
    cache.shutdown();
}

// == Concurrency ==

#[tokio::test]
async fn test_concurrent_set_many_no_cross_key_corruption() {
    let cache = std::sync::Arc::new(create_cache().await);

    let writes: Vec<_> = (0..100)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .set(
                        &format!("key:{i}"),
                        CacheValue::json(json!({"n": i})),
                        Some(60.0),
                        &[],
                    )
                    .await;
            })
        })
        .collect();
    for handle in writes {
        handle.await.unwrap();
    }

    for i in 0..100 {
        assert_eq!(
            cache.get(&format!("key:{i}")).await,
            Some(CacheValue::json(json!({"n": i}))),
            "key:{i} returned another call's value"
        );
    }
    cache.shutdown();
}

// == Degraded Shared Tier ==

#[tokio::test]
async fn test_cache_works_when_shared_tier_unreachable() {
    let config = Config {
        // Nothing listens here; the tier must be skipped, not fatal
        shared_cache_url: Some("redis://127.0.0.1:1".to_string()),
        sweep_interval: 3600,
        ..Config::default()
    };
    let cache = UnifiedCache::new(&config).await;

    cache
        .set("k", CacheValue::json(json!("still works")), Some(60.0), &[])
        .await;
    assert_eq!(
        cache.get("k").await,
        Some(CacheValue::json(json!("still works")))
    );
    cache.shutdown();
}

// == Response Shaping ==

#[tokio::test]
async fn test_create_response_applies_profile_directives() {
    let cache = create_cache().await;

    let response = cache.create_response(json!({"events": [1, 2]}), &API_STANDARD);
    assert_eq!(
        response.cache_control(),
        "public, max-age=60, s-maxage=300, stale-while-revalidate=600"
    );

    let response = cache.create_response(json!({"me": true}), &USER_PRIVATE);
    assert_eq!(response.cache_control(), "private, no-store");
    cache.shutdown();
}

#[tokio::test]
async fn test_create_response_via_named_profile_lookup() {
    let cache = create_cache().await;

    let db_profile = profile("DATABASE_QUERIES").expect("known profile");
    let response = cache.create_response(json!({"rows": 3}), db_profile);

    assert_eq!(response.cache_control(), "private, max-age=0");
    assert!(profile("UNKNOWN").is_none());
    cache.shutdown();
}

#[tokio::test]
async fn test_create_response_performs_no_cache_writes() {
    let cache = create_cache().await;

    let _ = cache.create_response(json!({"payload": 1}), &API_STANDARD);

    let stats = cache.stats().await;
    assert_eq!(stats.sets, 0);
    assert_eq!(stats.size, 0);
    cache.shutdown();
}
