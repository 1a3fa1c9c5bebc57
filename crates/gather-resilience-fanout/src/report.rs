//! Aggregated results of a gather run.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use gather_resilience_core::ClassifiedError;

/// Overall verdict for a gather run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherStatus {
    /// Every source produced a value (or was served from cache).
    Complete,
    /// At least one source produced a value and at least one did not.
    Partial,
    /// No source produced a value.
    AllFailed,
}

impl GatherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatherStatus::Complete => "complete",
            GatherStatus::Partial => "partial",
            GatherStatus::AllFailed => "all_failed",
        }
    }
}

impl fmt::Display for GatherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a source contributed nothing to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The per-source or overall deadline expired first.
    Timeout,
    /// The fetch ran to completion and returned an error.
    Error,
    /// The fetch completed but the subject does not exist upstream.
    NotFound,
    /// The source rejected our credentials; retrying cannot help.
    Unavailable,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::Error => "error",
            FailureReason::NotFound => "not_found",
            FailureReason::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in [`GatherReport::failures`], in completion order.
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub source: String,
    pub reason: FailureReason,
    pub message: Option<String>,
}

/// Per-source outcome kept under the source's name in the report.
#[derive(Debug, Clone)]
pub enum SourceOutcome<V> {
    Success {
        value: V,
        elapsed: Duration,
    },
    NotFound {
        elapsed: Duration,
    },
    Failed {
        error: ClassifiedError,
        timed_out: bool,
        elapsed: Duration,
    },
}

impl<V> SourceOutcome<V> {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Success { .. })
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            SourceOutcome::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            SourceOutcome::Success { elapsed, .. }
            | SourceOutcome::NotFound { elapsed }
            | SourceOutcome::Failed { elapsed, .. } => *elapsed,
        }
    }
}

/// What a gather run produced. Always returned, even when every source
/// failed; callers decide how much missing context they can tolerate.
#[derive(Debug, Clone)]
pub struct GatherReport<V> {
    pub status: GatherStatus,
    /// Outcome per source name. Cache-served sources appear as successes.
    pub outcomes: HashMap<String, SourceOutcome<V>>,
    /// Names that contributed values, with `"cache"` standing in for any
    /// source that was served from cache instead of fetched.
    pub sources_used: Vec<String>,
    /// Failures in the order they were observed.
    pub failures: Vec<FailureInfo>,
    /// Wall time for the whole run.
    pub elapsed: Duration,
}

impl<V> GatherReport<V> {
    /// Value produced by `source`, if it succeeded.
    pub fn value(&self, source: &str) -> Option<&V> {
        self.outcomes.get(source).and_then(SourceOutcome::value)
    }

    /// True when at least one source contributed a value.
    pub fn is_usable(&self) -> bool {
        self.status != GatherStatus::AllFailed
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}
