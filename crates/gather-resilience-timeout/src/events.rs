//! Events emitted by deadline-wrapped calls.

use gather_resilience_core::events::PatternEvent;
use std::time::{Duration, Instant};

/// Outcome events for one deadline-wrapped call.
#[derive(Debug, Clone)]
pub enum DeadlineEvent {
    /// The operation settled successfully before the deadline.
    Success {
        /// Deadline instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// How long the operation ran.
        elapsed: Duration,
    },
    /// The operation settled with its own failure before the deadline.
    Error {
        /// Deadline instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// How long the operation ran.
        elapsed: Duration,
    },
    /// The deadline fired first.
    Timeout {
        /// Deadline instance name.
        pattern_name: String,
        /// When the event was emitted.
        timestamp: Instant,
        /// The deadline that fired.
        limit: Duration,
    },
}

impl PatternEvent for DeadlineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DeadlineEvent::Success { .. } => "success",
            DeadlineEvent::Error { .. } => "error",
            DeadlineEvent::Timeout { .. } => "timeout",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            DeadlineEvent::Success { timestamp, .. }
            | DeadlineEvent::Error { timestamp, .. }
            | DeadlineEvent::Timeout { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            DeadlineEvent::Success { pattern_name, .. }
            | DeadlineEvent::Error { pattern_name, .. }
            | DeadlineEvent::Timeout { pattern_name, .. } => pattern_name,
        }
    }
}
