//! Resilient parallel context gathering for workflow automation.
//!
//! `gather-resilience` bundles the building blocks a workflow runner needs
//! when it fans out to unreliable upstreams: deadline-bounded parallel
//! gathering, a TTL cache-aside store, classification-aware retries with
//! escalation, and lightweight in-process metrics. Each pattern is available
//! as both an individual crate and as a feature in this meta-crate.
//!
//! # Patterns
//!
//! - **Fanout** (`fanout` feature): gathers from many sources at once and
//!   returns a usable report even when some of them fail
//! - **Cache** (`cache` feature): TTL cache-aside store with normalized keys
//! - **Retry** (`retry` feature): exponential backoff with jitter, driven by
//!   error classification, with operator escalation on terminal failure
//! - **Timeout** (`timeout` feature): deadline wrapper with typed errors
//! - **Metrics** (`metrics` feature): per-source counters and latency means
//!
//! # Usage
//!
//! Enable specific patterns via features:
//!
//! ```toml
//! [dependencies]
//! gather-resilience = { version = "0.1", features = ["fanout", "retry"] }
//! ```
//!
//! Or enable all patterns:
//!
//! ```toml
//! [dependencies]
//! gather-resilience = { version = "0.1", features = ["full"] }
//! ```
//!
//! Shared vocabulary (error classification, source and step identifiers,
//! the event listener registry, clocks) always comes along via [`core`].

// Re-export core (always available)
pub use gather_resilience_core as core;

// Re-export patterns based on features
#[cfg(feature = "cache")]
pub use gather_resilience_cache as cache;

#[cfg(feature = "fanout")]
pub use gather_resilience_fanout as fanout;

#[cfg(feature = "metrics")]
pub use gather_resilience_metrics as metrics;

#[cfg(feature = "retry")]
pub use gather_resilience_retry as retry;

#[cfg(feature = "timeout")]
pub use gather_resilience_timeout as timeout;
