//! Cache entry with TTL tracking.

use std::time::{Duration, SystemTime};

/// A cached research result.
///
/// Overwritten whole on refresh, never merged. `expires_at` is derived from
/// `fetched_at + ttl` at creation and double-checked on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// Normalized key the entry is stored under.
    pub key: String,
    /// The cached value.
    pub value: V,
    /// When the value was fetched.
    pub fetched_at: SystemTime,
    /// How long the entry stays fresh.
    pub ttl: Duration,
    /// `fetched_at + ttl`.
    pub expires_at: SystemTime,
    /// Names of the sources that produced the value.
    pub sources_used: Vec<String>,
}

impl<V> CacheEntry<V> {
    /// Creates an entry fetched `now`, fresh for `ttl`.
    pub fn new(
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        now: SystemTime,
        sources_used: Vec<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            fetched_at: now,
            ttl,
            expires_at: now + ttl,
            sources_used,
        }
    }

    /// Whether the entry is still fresh at `now`.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        now < self.expires_at
    }
}
