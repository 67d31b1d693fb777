//! HTTP Cache Profiles
//!
//! Named bundles of outbound caching directives, and the response
//! wrapper that applies them. These shape how browsers and CDNs treat a
//! response; internal freshness is decided by entry TTLs and is a
//! separate concern that merely shares these profile names.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

// == Visibility ==
/// How downstream caches may treat a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Cacheable by browsers and shared caches
    Public,
    /// Cacheable by the requesting browser only
    Private,
    /// Never stored downstream; per-user data
    NoStore,
}

// == Cache Profile ==
/// A named configuration for outbound caching directives.
#[derive(Debug, Clone, Copy)]
pub struct CacheProfile {
    /// Profile name, used for lookup and logs
    pub name: &'static str,
    pub visibility: Visibility,
    /// max-age for browsers, in seconds
    pub browser_max_age: u64,
    /// s-maxage for shared caches/CDNs, in seconds
    pub shared_max_age: u64,
    /// stale-while-revalidate window, in seconds
    pub stale_while_revalidate: u64,
    /// Conventional tags for content cached under this profile
    pub tags: &'static [&'static str],
}

/// Short browser TTL, longer CDN TTL with stale-while-revalidate; the
/// default for public listing endpoints.
pub static API_STANDARD: CacheProfile = CacheProfile {
    name: "API_STANDARD",
    visibility: Visibility::Public,
    browser_max_age: 60,
    shared_max_age: 300,
    stale_while_revalidate: 600,
    tags: &["api", "content"],
};

/// Server-side caching only; downstream caches must revalidate.
pub static DATABASE_QUERIES: CacheProfile = CacheProfile {
    name: "DATABASE_QUERIES",
    visibility: Visibility::Private,
    browser_max_age: 0,
    shared_max_age: 0,
    stale_while_revalidate: 0,
    tags: &["db"],
};

/// Per-user data, never stored downstream.
pub static USER_PRIVATE: CacheProfile = CacheProfile {
    name: "USER_PRIVATE",
    visibility: Visibility::NoStore,
    browser_max_age: 0,
    shared_max_age: 0,
    stale_while_revalidate: 0,
    tags: &["user"],
};

// == Profile Lookup ==
/// Resolves a profile by name.
pub fn profile(name: &str) -> Option<&'static CacheProfile> {
    match name {
        "API_STANDARD" => Some(&API_STANDARD),
        "DATABASE_QUERIES" => Some(&DATABASE_QUERIES),
        "USER_PRIVATE" => Some(&USER_PRIVATE),
        _ => None,
    }
}

impl CacheProfile {
    // == Cache Control ==
    /// Renders the Cache-Control header value for this profile.
    pub fn cache_control(&self) -> String {
        match self.visibility {
            Visibility::Public => format!(
                "public, max-age={}, s-maxage={}, stale-while-revalidate={}",
                self.browser_max_age, self.shared_max_age, self.stale_while_revalidate
            ),
            Visibility::Private => format!("private, max-age={}", self.browser_max_age),
            Visibility::NoStore => "private, no-store".to_string(),
        }
    }
}

// == Cached Response ==
/// An outbound response pairing a JSON body with caching directives.
///
/// Serialization happens when the response is rendered, so building one
/// is infallible and performs no cache operations.
#[derive(Debug)]
pub struct CachedResponse<T> {
    payload: T,
    profile: &'static CacheProfile,
}

impl<T> CachedResponse<T> {
    /// Creates a response for `payload` under the given profile.
    pub fn new(payload: T, profile: &'static CacheProfile) -> Self {
        Self { payload, profile }
    }

    /// The profile's rendered Cache-Control value.
    pub fn cache_control(&self) -> String {
        self.profile.cache_control()
    }

    /// Borrow the payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T: Serialize> IntoResponse for CachedResponse<T> {
    fn into_response(self) -> Response {
        (
            [(header::CACHE_CONTROL, self.profile.cache_control())],
            Json(self.payload),
        )
            .into_response()
    }
}
