//! Events emitted while a gather run progresses.

use std::time::{Duration, Instant};

use gather_resilience_core::events::PatternEvent;

use crate::report::{FailureReason, GatherStatus};

/// Lifecycle events for one gather run.
#[derive(Debug, Clone)]
pub enum FanoutEvent {
    /// A fresh cached value shadowed its bound source.
    CacheHit {
        pattern_name: String,
        timestamp: Instant,
        /// Normalized cache key that was found fresh.
        key: String,
    },
    /// Writing a fetched value back to the cache failed; the run goes on.
    CacheWriteFailed {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A source produced a value.
    SourceSucceeded {
        pattern_name: String,
        timestamp: Instant,
        source: String,
        elapsed: Duration,
    },
    /// A source contributed nothing.
    SourceFailed {
        pattern_name: String,
        timestamp: Instant,
        source: String,
        reason: FailureReason,
    },
    /// The run finished and the report is about to be returned.
    Completed {
        pattern_name: String,
        timestamp: Instant,
        status: GatherStatus,
        elapsed: Duration,
    },
}

impl PatternEvent for FanoutEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FanoutEvent::CacheHit { .. } => "cache_hit",
            FanoutEvent::CacheWriteFailed { .. } => "cache_write_failed",
            FanoutEvent::SourceSucceeded { .. } => "source_succeeded",
            FanoutEvent::SourceFailed { .. } => "source_failed",
            FanoutEvent::Completed { .. } => "completed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FanoutEvent::CacheHit { timestamp, .. }
            | FanoutEvent::CacheWriteFailed { timestamp, .. }
            | FanoutEvent::SourceSucceeded { timestamp, .. }
            | FanoutEvent::SourceFailed { timestamp, .. }
            | FanoutEvent::Completed { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            FanoutEvent::CacheHit { pattern_name, .. }
            | FanoutEvent::CacheWriteFailed { pattern_name, .. }
            | FanoutEvent::SourceSucceeded { pattern_name, .. }
            | FanoutEvent::SourceFailed { pattern_name, .. }
            | FanoutEvent::Completed { pattern_name, .. } => pattern_name,
        }
    }
}
