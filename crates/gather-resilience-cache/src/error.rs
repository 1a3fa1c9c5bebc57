//! Cache error type.

/// Failure of a cache backend operation.
///
/// Reads never fail (a broken read is a miss); writes and deletes surface
/// backend failures so the caller can decide whether caching was load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The backend rejected the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}
