//! Parallel context gathering over unreliable sources.
//!
//! [`Fanout::gather`] issues every registered [`SourceOperation`] at once,
//! wraps each in its own deadline, and folds the results into a
//! [`GatherReport`] as they complete. A failing source never fails the run:
//! its failure is classified, recorded, and the remaining sources keep going.
//! One source may be bound to a [`ResearchCache`]; a fresh cached value
//! shadows that source entirely and a fetched value is written back on the
//! way out.
//!
//! # Examples
//!
//! ```
//! use gather_resilience_core::SourceKind;
//! use gather_resilience_fanout::{Fanout, GatherStatus, SourceOperation};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fanout: Fanout<String> = Fanout::builder().name("brief-context").build();
//!
//! let report = fanout
//!     .gather(vec![
//!         SourceOperation::new("crm", SourceKind::Crm, async {
//!             Ok::<_, String>(Some("contact history".to_string()))
//!         }),
//!         SourceOperation::new("research", SourceKind::Research, async {
//!             Err::<Option<String>, _>("provider is down".to_string())
//!         }),
//!     ])
//!     .await
//!     .unwrap();
//!
//! assert_eq!(report.status, GatherStatus::Partial);
//! assert_eq!(report.value("crm").unwrap(), "contact history");
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use gather_resilience_core::{classify, ClassifyContext, ErrorKind, RawFailure, SourceKind};
use gather_resilience_metrics::OutcomeKind;
use gather_resilience_timeout::{with_deadline, DeadlineError};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

pub use config::{FanoutConfig, FanoutConfigBuilder};
pub use error::GatherError;
pub use events::FanoutEvent;
pub use operation::SourceOperation;
pub use report::{FailureInfo, FailureReason, GatherReport, GatherStatus, SourceOutcome};

mod config;
mod error;
mod events;
mod operation;
mod report;

/// Name recorded in [`GatherReport::sources_used`] when a value came from
/// the cache instead of a live fetch.
pub const CACHE_SOURCE: &str = "cache";

/// Fan-out gatherer. Cheap to clone; clones share the configuration.
pub struct Fanout<V> {
    config: Arc<FanoutConfig<V>>,
}

impl<V> Clone for Fanout<V> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

struct Completion<V> {
    name: String,
    kind: SourceKind,
    elapsed: Duration,
    result: Result<Option<V>, DeadlineError<RawFailure>>,
}

impl<V: Send + Sync> Fanout<V> {
    /// Starts building a fanout.
    pub fn builder() -> FanoutConfigBuilder<V> {
        FanoutConfigBuilder::new()
    }

    pub(crate) fn from_config(config: Arc<FanoutConfig<V>>) -> Self {
        Self { config }
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl<V: Clone + Send + Sync + 'static> Fanout<V> {
    /// Runs every operation concurrently and folds the outcomes into a
    /// [`GatherReport`].
    ///
    /// The only error is [`GatherError::DuplicateSource`], raised before any
    /// fetch starts. Once the fan-out is underway the run always produces a
    /// report; per-source failures are recorded in it, never propagated.
    pub async fn gather(
        &self,
        operations: Vec<SourceOperation<V>>,
    ) -> Result<GatherReport<V>, GatherError> {
        let config = &self.config;

        let mut seen = HashSet::new();
        for op in &operations {
            if !seen.insert(op.name.clone()) {
                return Err(GatherError::DuplicateSource(op.name.clone()));
            }
        }

        let started = Instant::now();
        let mut outcomes = std::collections::HashMap::new();
        let mut sources_used = Vec::new();
        let mut failures = Vec::new();
        let mut served_from_cache = false;

        // A fresh cached value shadows its bound source; the shadowed
        // operation is dropped without being polled.
        let mut pending = Vec::with_capacity(operations.len());
        for op in operations {
            if let Some(binding) = &config.cache {
                if op.name == binding.source {
                    if let Some(entry) = binding.cache.get(&binding.key) {
                        served_from_cache = true;

                        #[cfg(feature = "tracing")]
                        debug!(source = %op.name, key = %entry.key, "serving source from cache");

                        config.event_listeners.emit(&FanoutEvent::CacheHit {
                            pattern_name: config.name.clone(),
                            timestamp: Instant::now(),
                            key: entry.key.clone(),
                        });
                        if let Some(metrics) = &config.metrics {
                            metrics.record_skipped(&op.name);
                        }
                        sources_used.push(CACHE_SOURCE.to_string());
                        outcomes.insert(
                            op.name.clone(),
                            SourceOutcome::Success {
                                value: entry.value,
                                elapsed: Duration::ZERO,
                            },
                        );
                        continue;
                    }
                }
            }
            pending.push(op);
        }

        // Names still expected once the overall budget runs out.
        let mut outstanding: Vec<String> = pending.iter().map(|op| op.name.clone()).collect();

        let source_limit = config.source_limit;
        let mut tasks = FuturesUnordered::new();
        for op in pending {
            let SourceOperation { name, kind, fut } = op;
            tasks.push(async move {
                let begun = Instant::now();
                let result = with_deadline(&name, source_limit, fut).await;
                Completion {
                    elapsed: begun.elapsed(),
                    name,
                    kind,
                    result,
                }
            });
        }

        // Collect in completion order. When the overall budget expires the
        // drain stops; completions gathered so far are kept and the rest are
        // reported as timeouts below.
        let mut completed: Vec<Completion<V>> = Vec::new();
        {
            let drain = async {
                while let Some(done) = tasks.next().await {
                    completed.push(done);
                }
            };
            match config.overall_limit {
                Some(overall) => {
                    let _ = tokio::time::timeout(overall, drain).await;
                }
                None => drain.await,
            }
        }

        for done in completed {
            let Completion {
                name,
                kind,
                elapsed,
                result,
            } = done;
            outstanding.retain(|n| n != &name);

            match result {
                Ok(Some(value)) => {
                    if let Some(binding) = &config.cache {
                        if !served_from_cache && name == binding.source {
                            if let Err(_cache_err) =
                                binding
                                    .cache
                                    .put(&binding.key, value.clone(), vec![name.clone()])
                            {
                                #[cfg(feature = "tracing")]
                                warn!(source = %name, error = %_cache_err, "cache write-through failed");

                                config.event_listeners.emit(&FanoutEvent::CacheWriteFailed {
                                    pattern_name: config.name.clone(),
                                    timestamp: Instant::now(),
                                    key: binding.key.clone(),
                                });
                            }
                        }
                    }
                    self.record_success(&name, elapsed);
                    sources_used.push(name.clone());
                    outcomes.insert(name, SourceOutcome::Success { value, elapsed });
                }
                Ok(None) => {
                    self.record_failure(&name, FailureReason::NotFound, elapsed, &mut failures, None);
                    outcomes.insert(name, SourceOutcome::NotFound { elapsed });
                }
                Err(DeadlineError::Elapsed { limit, .. }) => {
                    let error = classify(
                        format!("'{name}' timed out after {}ms", limit.as_millis()),
                        &self.classify_ctx(kind),
                    );
                    self.record_failure(
                        &name,
                        FailureReason::Timeout,
                        elapsed,
                        &mut failures,
                        Some(error.message.clone()),
                    );
                    outcomes.insert(
                        name,
                        SourceOutcome::Failed {
                            error,
                            timed_out: true,
                            elapsed,
                        },
                    );
                }
                Err(DeadlineError::Inner(raw)) => {
                    let error = classify(raw, &self.classify_ctx(kind));
                    let timed_out = error.is_timeout();
                    let reason = if timed_out {
                        FailureReason::Timeout
                    } else if error.kind == ErrorKind::Unauthorized {
                        FailureReason::Unavailable
                    } else {
                        FailureReason::Error
                    };
                    self.record_failure(
                        &name,
                        reason,
                        elapsed,
                        &mut failures,
                        Some(error.message.clone()),
                    );
                    outcomes.insert(
                        name,
                        SourceOutcome::Failed {
                            error,
                            timed_out,
                            elapsed,
                        },
                    );
                }
            }
        }

        // Anything the overall budget cut off never completed; report it as
        // timed out at the budget boundary.
        for name in outstanding {
            let elapsed = config.overall_limit.unwrap_or(source_limit);
            let error = classify(
                format!("'{name}' was cut off by the gather deadline"),
                &ClassifyContext::new(config.operation),
            );
            self.record_failure(
                &name,
                FailureReason::Timeout,
                elapsed,
                &mut failures,
                Some(error.message.clone()),
            );
            outcomes.insert(
                name,
                SourceOutcome::Failed {
                    error,
                    timed_out: true,
                    elapsed,
                },
            );
        }

        let any_success = outcomes.values().any(SourceOutcome::is_success);
        let status = if failures.is_empty() {
            GatherStatus::Complete
        } else if any_success {
            GatherStatus::Partial
        } else {
            GatherStatus::AllFailed
        };

        let elapsed = started.elapsed();
        if let Some(metrics) = &config.metrics {
            metrics.record_latency(&config.name, elapsed);
        }
        config.event_listeners.emit(&FanoutEvent::Completed {
            pattern_name: config.name.clone(),
            timestamp: Instant::now(),
            status,
            elapsed,
        });

        #[cfg(feature = "tracing")]
        debug!(
            name = %config.name,
            status = %status,
            successes = outcomes.values().filter(|o| o.is_success()).count(),
            failures = failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "gather finished"
        );

        Ok(GatherReport {
            status,
            outcomes,
            sources_used,
            failures,
            elapsed,
        })
    }

    fn classify_ctx(&self, kind: SourceKind) -> ClassifyContext {
        ClassifyContext::new(self.config.operation).with_source(kind)
    }

    fn record_success(&self, source: &str, elapsed: Duration) {
        if let Some(metrics) = &self.config.metrics {
            metrics.record_outcome(source, OutcomeKind::Success);
            metrics.record_latency(source, elapsed);
        }
        self.config
            .event_listeners
            .emit(&FanoutEvent::SourceSucceeded {
                pattern_name: self.config.name.clone(),
                timestamp: Instant::now(),
                source: source.to_string(),
                elapsed,
            });
    }

    fn record_failure(
        &self,
        source: &str,
        reason: FailureReason,
        elapsed: Duration,
        failures: &mut Vec<FailureInfo>,
        message: Option<String>,
    ) {
        if let Some(metrics) = &self.config.metrics {
            let outcome = match reason {
                FailureReason::Timeout => OutcomeKind::Timeout,
                _ => OutcomeKind::Failure,
            };
            metrics.record_outcome(source, outcome);
            metrics.record_latency(source, elapsed);
        }
        self.config.event_listeners.emit(&FanoutEvent::SourceFailed {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            source: source.to_string(),
            reason,
        });
        failures.push(FailureInfo {
            source: source.to_string(),
            reason,
            message,
        });
    }
}
