//! Long-lived success-rate and latency bookkeeping.
//!
//! A [`MetricsRecorder`] is the single owner of all long-lived metric state
//! in a process: per-source attempt/success/failure/timeout counters and
//! per-category latency averages. Updates are O(1): averages use the
//! incremental-mean formula, so no raw samples are retained and nothing
//! grows with uptime. All mutation goes through one mutex, so
//! concurrent gather calls can report completions in any interleaving.
//!
//! With the `metrics` cargo feature, every update is also mirrored through
//! the `metrics` facade for external exporters.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

/// How a recorded operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The source produced data.
    Success,
    /// The source failed or returned nothing.
    Failure,
    /// The source hit its deadline. Counted as a failure too.
    Timeout,
}

/// What to do when a source is skipped (e.g. shadowed by a cache hit).
///
/// Counting never-attempted sources against their success rate makes the
/// rate misleading for cache-friendly workloads; `Ignore` is the default
/// for that reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkippedSourcePolicy {
    /// A skipped source leaves its counters untouched.
    #[default]
    Ignore,
    /// A skipped source counts as an attempt and a failure.
    CountAsFailure,
}

/// Counters for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceStats {
    /// Completed operations, success or not.
    pub attempts: u64,
    /// Operations that produced data.
    pub successes: u64,
    /// Operations that failed, timeouts included.
    pub failures: u64,
    /// The subset of failures that were deadline expiries.
    pub timeouts: u64,
    /// `successes / attempts`, `0.0` before the first attempt.
    pub rate: f64,
}

impl SourceStats {
    fn record(&mut self, outcome: OutcomeKind) {
        self.attempts += 1;
        match outcome {
            OutcomeKind::Success => self.successes += 1,
            OutcomeKind::Failure => self.failures += 1,
            OutcomeKind::Timeout => {
                self.failures += 1;
                self.timeouts += 1;
            }
        }
        // attempts > 0 here by construction.
        self.rate = self.successes as f64 / self.attempts as f64;
    }
}

/// Incremental running mean. O(1) update, no sample retention.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningAverage {
    /// Samples folded in so far.
    pub count: u64,
    /// Mean of those samples.
    pub average: f64,
}

impl RunningAverage {
    /// Folds one sample into the mean.
    pub fn record(&mut self, value: f64) {
        self.count += 1;
        // Seed case included: (value - 0) / 1 == value.
        self.average += (value - self.average) / self.count as f64;
    }
}

#[derive(Default)]
struct State {
    sources: HashMap<String, SourceStats>,
    latencies: HashMap<String, RunningAverage>,
}

/// Point-in-time copy of all recorded state.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Per-source counters.
    pub sources: HashMap<String, SourceStats>,
    /// Per-category latency averages (milliseconds).
    pub latencies: HashMap<String, RunningAverage>,
}

/// Sole owner and mutator of long-lived metric state.
pub struct MetricsRecorder {
    skipped_policy: SkippedSourcePolicy,
    state: Mutex<State>,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    /// Creates a recorder with [`SkippedSourcePolicy::Ignore`].
    pub fn new() -> Self {
        Self::with_skipped_policy(SkippedSourcePolicy::Ignore)
    }

    /// Creates a recorder with an explicit skipped-source policy.
    pub fn with_skipped_policy(skipped_policy: SkippedSourcePolicy) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "gather_source_outcomes_total",
                "Completed source operations by result"
            );
            describe_histogram!(
                "gather_latency_seconds",
                "Latency of completed operations by category"
            );
        }

        Self {
            skipped_policy,
            state: Mutex::new(State::default()),
        }
    }

    /// Records one completed operation for `source`.
    pub fn record_outcome(&self, source: &str, outcome: OutcomeKind) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.sources.entry(source.to_string()).or_default().record(outcome);
        }

        #[cfg(feature = "metrics")]
        {
            let result = match outcome {
                OutcomeKind::Success => "success",
                OutcomeKind::Failure => "failure",
                OutcomeKind::Timeout => "timeout",
            };
            counter!("gather_source_outcomes_total", "source" => source.to_string(), "result" => result).increment(1);
        }
    }

    /// Records one latency sample for `category`.
    pub fn record_latency(&self, category: &str, elapsed: Duration) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state
                .latencies
                .entry(category.to_string())
                .or_default()
                .record(elapsed.as_secs_f64() * 1000.0);
        }

        #[cfg(feature = "metrics")]
        histogram!("gather_latency_seconds", "category" => category.to_string())
            .record(elapsed.as_secs_f64());
    }

    /// Applies the skipped-source policy for a source that never ran.
    pub fn record_skipped(&self, source: &str) {
        match self.skipped_policy {
            SkippedSourcePolicy::Ignore => {}
            SkippedSourcePolicy::CountAsFailure => {
                self.record_outcome(source, OutcomeKind::Failure)
            }
        }
    }

    /// Counters for one source; zeroed stats if it was never recorded.
    pub fn source_stats(&self, source: &str) -> SourceStats {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sources
            .get(source)
            .copied()
            .unwrap_or_default()
    }

    /// Latency average for one category, if any samples were recorded.
    pub fn latency(&self, category: &str) -> Option<RunningAverage> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .latencies
            .get(category)
            .copied()
    }

    /// Copies out all recorded state.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        MetricsSnapshot {
            sources: state.sources.clone(),
            latencies: state.latencies.clone(),
        }
    }

    /// Clears all state. Explicit session reset only.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.sources.clear();
        state.latencies.clear();
    }
}
