//! Retry configuration and builder.

use crate::backoff::{BackoffStrategy, ExponentialJitterBackoff, FixedDelay};
use crate::events::RetryEvent;
use crate::notify::Notifier;
use gather_resilience_core::events::{EventListeners, FnListener};
use std::sync::Arc;
use std::time::Duration;

/// Attempt budget and delay numerics. Defaults suit outreach delivery:
/// 3 attempts, 1s base, 30s cap, ±10% jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the initial one included.
    pub max_attempts: usize,
    /// First rung of the exponential ladder.
    pub base_delay: Duration,
    /// Cap on the ladder.
    pub max_delay: Duration,
    /// Symmetric jitter as a fraction of the capped delay.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.1,
        }
    }
}

/// Escalation target for terminal failures.
pub(crate) struct Escalation {
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) channel: String,
}

/// Configuration for [`with_retry`](crate::with_retry).
pub struct RetryConfig {
    pub(crate) policy: RetryPolicy,
    pub(crate) backoff: Arc<dyn BackoffStrategy>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
    pub(crate) escalation: Option<Escalation>,
}

impl RetryConfig {
    /// Starts a builder with the default policy.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// The configured policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder {
    policy: RetryPolicy,
    backoff: Option<Arc<dyn BackoffStrategy>>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
    escalation: Option<Escalation>,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - policy: [`RetryPolicy::default`] (3 attempts, 1s/30s ladder, 0.1 jitter)
    /// - backoff: exponential ladder derived from the policy
    /// - name: `"<unnamed>"`
    /// - escalation: none
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            backoff: None,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
            escalation: None,
        }
    }

    /// Replaces the whole policy.
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the attempt budget (initial attempt included).
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.policy.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the first rung of the exponential ladder.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.policy.base_delay = base_delay;
        self
    }

    /// Caps the ladder.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.policy.max_delay = max_delay;
        self
    }

    /// Sets the jitter factor, clamped to `0.0..=1.0`.
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.policy.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Uses the same delay between all attempts instead of the ladder.
    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.backoff = Some(Arc::new(FixedDelay::new(delay)));
        self
    }

    /// Replaces the backoff strategy entirely.
    pub fn backoff<B>(mut self, backoff: B) -> Self
    where
        B: BackoffStrategy + 'static,
    {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Sets the instance name (used in events and escalation messages).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Routes terminal-failure escalations to `channel` on `notifier`.
    pub fn escalate_to(mut self, notifier: Arc<dyn Notifier>, channel: impl Into<String>) -> Self {
        self.escalation = Some(Escalation {
            notifier,
            channel: channel.into(),
        });
        self
    }

    /// Registers a callback before each backoff sleep.
    ///
    /// Receives the failed attempt number (0-indexed) and the delay.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback on success, with the total attempt count.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when the attempt budget runs out.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when a failure is classified non-retryable.
    pub fn on_not_retryable<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, RetryEvent::NotRetryable { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the config.
    pub fn build(self) -> RetryConfig {
        let backoff = self.backoff.unwrap_or_else(|| {
            Arc::new(
                ExponentialJitterBackoff::new(self.policy.base_delay, self.policy.max_delay)
                    .jitter_factor(self.policy.jitter_factor),
            )
        });

        RetryConfig {
            policy: self.policy,
            backoff,
            event_listeners: self.event_listeners,
            name: self.name,
            escalation: self.escalation,
        }
    }
}
