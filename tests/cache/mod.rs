//! Cache-aside store tests.
//!
//! Test organization:
//! - keys.rs: key normalization and collision behavior
//! - freshness.rs: TTL, clock injection, and stale eviction

mod freshness;
mod keys;
