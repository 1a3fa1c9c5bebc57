//! Cache-aside store for expensive derived data (company research).
//!
//! The read path checks the cache first; the caller falls back to the
//! source-of-truth fetch on a miss and writes the result back. Entries carry
//! a TTL and are double-checked against an injected [`Clock`] on every read,
//! so a backend with its own expiry (or with clock skew) can never serve a
//! stale entry. Keys are normalized slugs ([`normalize_key`]) so name
//! variants share one entry.
//!
//! # Examples
//!
//! ```
//! use gather_resilience_cache::{MemoryBackend, ResearchCache};
//! use gather_resilience_core::ManualClock;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::default());
//! let cache: ResearchCache<String> = ResearchCache::builder()
//!     .backend(Arc::new(MemoryBackend::new()))
//!     .clock(clock.clone())
//!     .default_ttl(Duration::from_secs(3600))
//!     .build();
//!
//! cache.put("Acme, Inc.", "research notes".to_string(), vec!["research".into()]).unwrap();
//! assert!(cache.get("acme inc").is_some());
//!
//! clock.advance(Duration::from_secs(3601));
//! assert!(cache.get("acme inc").is_none());
//! ```

use gather_resilience_core::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

pub use backend::{CacheBackend, MemoryBackend};
pub use entry::CacheEntry;
pub use error::CacheError;
pub use key::normalize_key;

mod backend;
mod entry;
mod error;
mod key;

/// Default freshness window for company research.
pub const DEFAULT_RESEARCH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// TTL-bearing, key-normalized cache over a pluggable backend.
pub struct ResearchCache<V> {
    backend: Arc<dyn CacheBackend<V>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<V> Clone for ResearchCache<V> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            clock: Arc::clone(&self.clock),
            default_ttl: self.default_ttl,
        }
    }
}

/// Builder for [`ResearchCache`].
pub struct ResearchCacheBuilder<V> {
    backend: Option<Arc<dyn CacheBackend<V>>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<V: Send + Sync + 'static> ResearchCacheBuilder<V> {
    fn new() -> Self {
        Self {
            backend: None,
            clock: Arc::new(SystemClock),
            default_ttl: DEFAULT_RESEARCH_TTL,
        }
    }

    /// Sets the storage backend.
    pub fn backend(mut self, backend: Arc<dyn CacheBackend<V>>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Injects the time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the TTL used by [`ResearchCache::put`]. Defaults to
    /// [`DEFAULT_RESEARCH_TTL`].
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Builds the cache.
    pub fn build(self) -> ResearchCache<V> {
        ResearchCache {
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(NullBackend(std::marker::PhantomData))),
            clock: self.clock,
            default_ttl: self.default_ttl,
        }
    }
}

// Backend used when none is configured: every read misses, writes vanish.
struct NullBackend<V>(std::marker::PhantomData<fn() -> V>);

impl<V: Send + Sync> CacheBackend<V> for NullBackend<V> {
    fn get(&self, _key: &str) -> Option<CacheEntry<V>> {
        None
    }

    fn set(&self, _key: &str, _entry: CacheEntry<V>) -> Result<(), CacheError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

impl<V: Send + Sync + 'static> ResearchCache<V> {
    /// Starts building a cache.
    pub fn builder() -> ResearchCacheBuilder<V> {
        ResearchCacheBuilder::new()
    }

    /// Creates a cache over `backend` with the default TTL and system clock.
    pub fn new(backend: Arc<dyn CacheBackend<V>>) -> Self {
        Self::builder().backend(backend).build()
    }

    /// Looks up `raw_key`, returning only a fresh entry.
    ///
    /// Freshness is re-checked against the injected clock even if the
    /// backend expires on its own; an entry past `expires_at` is deleted and
    /// reported as a miss.
    pub fn get(&self, raw_key: &str) -> Option<CacheEntry<V>> {
        let key = normalize_key(raw_key);
        let entry = self.backend.get(&key)?;

        if entry.is_fresh(self.clock.now()) {
            Some(entry)
        } else {
            #[cfg(feature = "tracing")]
            debug!(key = %key, "evicting stale cache entry");

            // Best effort; a failed delete just means the next read re-checks.
            let _ = self.backend.delete(&key);
            None
        }
    }

    /// Stores `value` under the normalized form of `raw_key` with the
    /// default TTL, replacing any previous entry. Returns the normalized key.
    pub fn put(
        &self,
        raw_key: &str,
        value: V,
        sources_used: Vec<String>,
    ) -> Result<String, CacheError> {
        self.put_with_ttl(raw_key, value, self.default_ttl, sources_used)
    }

    /// [`ResearchCache::put`] with an explicit TTL.
    pub fn put_with_ttl(
        &self,
        raw_key: &str,
        value: V,
        ttl: Duration,
        sources_used: Vec<String>,
    ) -> Result<String, CacheError> {
        let key = normalize_key(raw_key);
        let entry = CacheEntry::new(key.clone(), value, ttl, self.clock.now(), sources_used);
        self.backend.set(&key, entry)?;
        Ok(key)
    }

    /// Removes the entry for `raw_key`, if any.
    pub fn invalidate(&self, raw_key: &str) -> Result<(), CacheError> {
        self.backend.delete(&normalize_key(raw_key))
    }

    /// The TTL applied by [`ResearchCache::put`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
