//! Classified retry with bounded, jittered backoff and escalation.
//!
//! [`with_retry`] re-invokes a failing operation up to a bounded attempt
//! count. After every failure the error is classified
//! ([`gather_resilience_core::classify`]) and the classification drives the
//! loop: non-retryable failures stop immediately, a classifier-suggested
//! delay (e.g. from a `Retry-After` header) overrides the exponential
//! ladder, and the terminal failure triggers exactly one escalation
//! notification through the configured [`Notifier`].
//!
//! # Examples
//!
//! ```
//! use gather_resilience_core::{ClassifyContext, WorkflowStep};
//! use gather_resilience_retry::{with_retry, RetryConfig};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = RetryConfig::builder()
//!     .name("slack-delivery")
//!     .max_attempts(3)
//!     .fixed_backoff(Duration::from_millis(10))
//!     .build();
//! let ctx = ClassifyContext::new(WorkflowStep::Delivery);
//!
//! let outcome = with_retry(&config, &ctx, |attempt| async move {
//!     if attempt < 1 {
//!         Err("connection reset")
//!     } else {
//!         Ok("posted")
//!     }
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(outcome.value, "posted");
//! assert_eq!(outcome.attempts, 2);
//! # }
//! ```

use gather_resilience_core::{classify, ClassifiedError, ClassifyContext, RawFailure};
use std::future::Future;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

pub use backoff::{BackoffStrategy, ExponentialJitterBackoff, FixedDelay};
pub use config::{RetryConfig, RetryConfigBuilder, RetryPolicy};
pub use error::RetryError;
pub use events::RetryEvent;
pub use notify::{Notifier, NotifyError, RecordingNotifier};

mod backoff;
mod config;
mod error;
mod events;
mod notify;

/// Successful result of a retry-wrapped call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T> {
    /// The operation's value.
    pub value: T,
    /// Attempts made, the successful one included.
    pub attempts: usize,
    /// Wall time across all attempts and sleeps.
    pub elapsed: Duration,
}

// Classifier-suggested delay wins over the ladder; either way the policy
// cap bounds the sleep.
fn select_delay(classified: &ClassifiedError, config: &RetryConfig, attempt: usize) -> Duration {
    classified
        .retry_after
        .unwrap_or_else(|| config.backoff.delay(attempt))
        .min(config.policy.max_delay)
}

/// Runs `op` until it succeeds, fails non-retryably, or the budget runs out.
///
/// `op` receives the 0-indexed attempt number. The sleep between attempts
/// never follows the final one, and the final failure sends exactly one
/// escalation if the config has one; a failing notifier is swallowed.
pub async fn with_retry<T, F, Fut, R>(
    config: &RetryConfig,
    ctx: &ClassifyContext,
    mut op: F,
) -> Result<RetryOutcome<T>, RetryError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, R>>,
    R: Into<RawFailure>,
{
    #[cfg(feature = "metrics")]
    {
        describe_counter!("retry_attempts_total", "Attempts made by retry loops");
        describe_counter!(
            "retry_terminal_total",
            "Retry loops ending in success, exhaustion, or a non-retryable failure"
        );
        describe_counter!("retry_escalations_total", "Escalation notifications sent");
    }

    let started = Instant::now();
    let mut attempt = 0;

    loop {
        #[cfg(feature = "metrics")]
        counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

        match op(attempt).await {
            Ok(value) => {
                let attempts = attempt + 1;
                config.event_listeners.emit(&RetryEvent::Success {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempts,
                });

                #[cfg(feature = "metrics")]
                counter!("retry_terminal_total", "retry" => config.name.clone(), "result" => "success").increment(1);

                #[cfg(feature = "tracing")]
                debug!(retry = %config.name, attempts, "operation succeeded");

                return Ok(RetryOutcome {
                    value,
                    attempts,
                    elapsed: started.elapsed(),
                });
            }
            Err(raw) => {
                let attempt_ctx = ctx
                    .clone()
                    .with_attempts(attempt, config.policy.max_attempts);
                let classified = classify(raw, &attempt_ctx);
                let attempts = attempt + 1;

                if !classified.retryable {
                    config.event_listeners.emit(&RetryEvent::NotRetryable {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("retry_terminal_total", "retry" => config.name.clone(), "result" => "not_retryable").increment(1);

                    escalate(config, ctx, &classified, attempts).await;
                    return Err(RetryError::NotRetryable {
                        error: classified,
                        attempts,
                    });
                }

                if attempts >= config.policy.max_attempts {
                    config.event_listeners.emit(&RetryEvent::Exhausted {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("retry_terminal_total", "retry" => config.name.clone(), "result" => "exhausted").increment(1);

                    escalate(config, ctx, &classified, attempts).await;
                    return Err(RetryError::ExhaustedRetries {
                        error: classified,
                        attempts,
                    });
                }

                let delay = select_delay(&classified, config, attempt);
                config.event_listeners.emit(&RetryEvent::Retry {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempt,
                    delay,
                });

                #[cfg(feature = "tracing")]
                debug!(
                    retry = %config.name,
                    attempt,
                    delay_ms = delay.as_millis(),
                    kind = %classified.kind,
                    "attempt failed, backing off"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

// One escalation per terminal failure. Notifier trouble is logged, never
// propagated: escalation is an optimization for humans.
async fn escalate(
    config: &RetryConfig,
    ctx: &ClassifyContext,
    classified: &ClassifiedError,
    attempts: usize,
) {
    let Some(escalation) = &config.escalation else {
        return;
    };

    let message = format!(
        "'{}' ({}) failed for good after {} attempt(s): {}",
        config.name,
        ctx.operation,
        attempts,
        classified.detailed()
    );

    match escalation
        .notifier
        .notify(&escalation.channel, &message)
        .await
    {
        Ok(()) => {
            config.event_listeners.emit(&RetryEvent::Escalated {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
                channel: escalation.channel.clone(),
            });

            #[cfg(feature = "metrics")]
            counter!("retry_escalations_total", "retry" => config.name.clone()).increment(1);
        }
        Err(_err) => {
            #[cfg(feature = "tracing")]
            warn!(
                retry = %config.name,
                channel = %escalation.channel,
                error = %_err,
                "escalation notification failed"
            );
        }
    }
}
