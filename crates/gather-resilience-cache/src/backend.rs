//! Pluggable storage behind the cache.

use crate::entry::CacheEntry;
use crate::error::CacheError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage interface the cache writes through.
///
/// Backends store whole entries keyed by normalized key; last writer wins.
/// A backend may expire entries on its own, but freshness is still
/// re-checked by the cache against its clock, so a backend that returns
/// stale entries is harmless.
pub trait CacheBackend<V>: Send + Sync {
    /// Fetches the entry for `key`, if the backend has one.
    fn get(&self, key: &str) -> Option<CacheEntry<V>>;

    /// Stores `entry` under `key`, replacing any previous entry.
    fn set(&self, key: &str, entry: CacheEntry<V>) -> Result<(), CacheError>;

    /// Removes the entry for `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process map backend.
pub struct MemoryBackend<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> MemoryBackend<V> {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for MemoryBackend<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> CacheBackend<V> for MemoryBackend<V> {
    fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, entry: CacheEntry<V>) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}
