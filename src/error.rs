//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.
//!
//! Tier failures never reach callers: each tier catches its own
//! `TierError` and degrades to a miss (reads) or a skipped write. The
//! only error a caller can observe is the one produced by its own
//! fetch closure, which `get_or_fetch` passes through unchanged.

use std::time::Duration;

use thiserror::Error;

// == Tier Error Enum ==
/// Internal error type for tier operations.
#[derive(Error, Debug)]
pub enum TierError {
    /// Backend not reachable (connection refused, dropped, unconfigured)
    #[error("{tier} tier unavailable: {reason}")]
    Unavailable {
        /// Tier name for logs
        tier: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// Payload could not cross the serialization boundary
    #[error("{tier} tier serialization failed for key '{key}': {reason}")]
    Serialization {
        /// Tier name for logs
        tier: &'static str,
        /// Affected cache key
        key: String,
        /// Underlying cause
        reason: String,
    },

    /// Tier call exceeded its internal deadline
    #[error("{tier} tier operation timed out after {timeout:?}")]
    Timeout {
        /// Tier name for logs
        tier: &'static str,
        /// Configured per-operation deadline
        timeout: Duration,
    },
}

impl TierError {
    /// Creates an Unavailable error for the given tier.
    pub fn unavailable(tier: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            tier,
            reason: reason.into(),
        }
    }

    /// Creates a Serialization error for the given tier and key.
    pub fn serialization(
        tier: &'static str,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Serialization {
            tier,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for internal tier operations.
pub type TierResult<T> = std::result::Result<T, TierError>;
