//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Cache layer configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Loaded once at process start; there is no hot reload.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared tier connection URL; None disables the shared tier entirely
    pub shared_cache_url: Option<String>,
    /// Default TTL in seconds for entries set without an explicit TTL
    pub default_ttl: f64,
    /// Maximum serialized size of a single client-tier value, in bytes
    pub client_max_value_bytes: usize,
    /// Total serialized budget of the client tier, in bytes
    pub client_max_total_bytes: usize,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Per-operation deadline for shared tier calls, in milliseconds
    pub shared_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHARED_CACHE_URL` - Shared tier URL, e.g. `redis://localhost:6379` (default: unset, tier disabled)
    /// - `DEFAULT_TTL` - Default TTL in seconds, fractional values allowed (default: 300)
    /// - `CLIENT_MAX_VALUE_BYTES` - Per-value client tier cap (default: 4096)
    /// - `CLIENT_MAX_TOTAL_BYTES` - Total client tier budget (default: 32768)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SHARED_TIMEOUT_MS` - Shared tier per-call deadline (default: 250)
    pub fn from_env() -> Self {
        Self {
            shared_cache_url: env::var("SHARED_CACHE_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300.0),
            client_max_value_bytes: env::var("CLIENT_MAX_VALUE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4096),
            client_max_total_bytes: env::var("CLIENT_MAX_TOTAL_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32 * 1024),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            shared_timeout_ms: env::var("SHARED_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(250),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shared_cache_url: None,
            default_ttl: 300.0,
            client_max_value_bytes: 4096,
            client_max_total_bytes: 32 * 1024,
            sweep_interval: 60,
            shared_timeout_ms: 250,
        }
    }
}
