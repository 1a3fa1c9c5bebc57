//! Deadline racing for async operations.
//!
//! A [`Deadline`] races an operation against a time limit. Whichever settles
//! first decides the outcome; the loser is dropped, so no timer or task
//! outlives the call. Timeouts become a distinguishable
//! [`DeadlineError::Elapsed`] carrying the operation label and the limit,
//! while the operation's own result or failure passes through unchanged.
//!
//! # Examples
//!
//! ```
//! use gather_resilience_timeout::{Deadline, DeadlineError};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let deadline = Deadline::builder()
//!     .limit(Duration::from_millis(50))
//!     .name("crm-lookup")
//!     .build();
//!
//! let result: Result<&str, DeadlineError<std::io::Error>> =
//!     deadline.run(async { Ok("contact data") }).await;
//! assert_eq!(result.unwrap(), "contact data");
//! # }
//! ```
//!
//! One-off call sites can use [`with_deadline`] instead of building an
//! instance.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

pub use config::{DeadlineConfig, DeadlineConfigBuilder, DEFAULT_LIMIT};
pub use error::DeadlineError;
pub use events::DeadlineEvent;

mod config;
mod error;
mod events;

/// A reusable "race against a deadline" combinator.
#[derive(Clone)]
pub struct Deadline {
    config: Arc<DeadlineConfig>,
}

impl Deadline {
    /// Starts building a deadline.
    pub fn builder() -> DeadlineConfigBuilder {
        DeadlineConfigBuilder::new()
    }

    /// Creates a deadline with the given limit and label, no listeners.
    pub fn new(limit: Duration, name: impl Into<String>) -> Self {
        Self::builder().limit(limit).name(name).build()
    }

    pub(crate) fn from_config(config: Arc<DeadlineConfig>) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "deadline_calls_total",
                "Total deadline-wrapped calls by result"
            );
            describe_histogram!(
                "deadline_call_duration_seconds",
                "Duration of calls that settled before their deadline"
            );
        }

        Self { config }
    }

    /// The configured limit.
    pub fn limit(&self) -> Duration {
        self.config.limit
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Derives a child deadline no larger than this one.
    ///
    /// Used when an outer budget bounds a whole batch: each sub-operation
    /// gets `min(limit, parent limit)` so nothing outlives the parent.
    pub fn child(&self, limit: Duration, name: impl Into<String>) -> Self {
        Self::builder()
            .limit(limit.min(self.config.limit))
            .name(name)
            .build()
    }

    /// Races `op` against the deadline.
    ///
    /// Returns `op`'s own result or failure if it settles first, and
    /// [`DeadlineError::Elapsed`] if the deadline fires first. The losing
    /// side is dropped either way.
    pub async fn run<T, E, F>(&self, op: F) -> Result<T, DeadlineError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let config = &self.config;
        let start = Instant::now();

        match timeout(config.limit, op).await {
            Ok(Ok(value)) => {
                let elapsed = start.elapsed();
                config.event_listeners.emit(&DeadlineEvent::Success {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    elapsed,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("deadline_calls_total", "deadline" => config.name.clone(), "result" => "success").increment(1);
                    histogram!("deadline_call_duration_seconds", "deadline" => config.name.clone())
                        .record(elapsed.as_secs_f64());
                }

                #[cfg(feature = "tracing")]
                debug!(
                    deadline = %config.name,
                    elapsed_ms = elapsed.as_millis(),
                    "operation settled within deadline"
                );

                Ok(value)
            }
            Ok(Err(err)) => {
                let elapsed = start.elapsed();
                config.event_listeners.emit(&DeadlineEvent::Error {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    elapsed,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("deadline_calls_total", "deadline" => config.name.clone(), "result" => "error").increment(1);
                    histogram!("deadline_call_duration_seconds", "deadline" => config.name.clone())
                        .record(elapsed.as_secs_f64());
                }

                #[cfg(feature = "tracing")]
                debug!(
                    deadline = %config.name,
                    elapsed_ms = elapsed.as_millis(),
                    "operation failed within deadline"
                );

                Err(DeadlineError::Inner(err))
            }
            Err(_elapsed) => {
                config.event_listeners.emit(&DeadlineEvent::Timeout {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    limit: config.limit,
                });

                #[cfg(feature = "metrics")]
                {
                    counter!("deadline_calls_total", "deadline" => config.name.clone(), "result" => "timeout").increment(1);
                }

                #[cfg(feature = "tracing")]
                warn!(
                    deadline = %config.name,
                    limit_ms = config.limit.as_millis(),
                    "operation hit deadline"
                );

                Err(DeadlineError::Elapsed {
                    label: config.name.clone(),
                    limit: config.limit,
                })
            }
        }
    }
}

/// Races `op` against `limit` without building a [`Deadline`] first.
pub async fn with_deadline<T, E, F>(
    label: &str,
    limit: Duration,
    op: F,
) -> Result<T, DeadlineError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    Deadline::new(limit, label).run(op).await
}
