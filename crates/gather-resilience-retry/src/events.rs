//! Events emitted by the retry engine.

use gather_resilience_core::events::PatternEvent;
use std::time::{Duration, Instant};

/// Lifecycle events for one retry-wrapped call.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A failed attempt will be retried after `delay`.
    Retry {
        /// Retry instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// The attempt that just failed (0-indexed).
        attempt: usize,
        /// Sleep before the next attempt.
        delay: Duration,
    },
    /// The call succeeded.
    Success {
        /// Retry instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// Total attempts made, the successful one included.
        attempts: usize,
    },
    /// The attempt budget ran out.
    Exhausted {
        /// Retry instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// Total attempts made.
        attempts: usize,
    },
    /// The failure was classified non-retryable; no further attempts.
    NotRetryable {
        /// Retry instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// Total attempts made.
        attempts: usize,
    },
    /// An escalation notification went out.
    Escalated {
        /// Retry instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// Channel the notification was sent to.
        channel: String,
    },
}

impl PatternEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::NotRetryable { .. } => "not_retryable",
            RetryEvent::Escalated { .. } => "escalated",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::NotRetryable { timestamp, .. }
            | RetryEvent::Escalated { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            RetryEvent::Retry { pattern_name, .. }
            | RetryEvent::Success { pattern_name, .. }
            | RetryEvent::Exhausted { pattern_name, .. }
            | RetryEvent::NotRetryable { pattern_name, .. }
            | RetryEvent::Escalated { pattern_name, .. } => pattern_name,
        }
    }
}
