//! Backoff strategies.

use std::time::Duration;

/// Computes the delay before the next retry attempt.
pub trait BackoffStrategy: Send + Sync {
    /// Delay after failed attempt `attempt` (0-indexed).
    fn delay(&self, attempt: usize) -> Duration;
}

/// Same delay for every attempt.
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Creates a fixed-delay strategy.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl BackoffStrategy for FixedDelay {
    fn delay(&self, _attempt: usize) -> Duration {
        self.delay
    }
}

/// Exponential backoff, capped, with symmetric jitter.
///
/// The un-jittered ladder is `base * 2^attempt` capped at `max`; jitter then
/// perturbs each rung by up to `± jitter_factor` of its value. With the
/// reference policy (1s base, 30s cap) the ladder is 1s, 2s, 4s, 8s, 16s,
/// 30s, 30s, … The jittered delay is never negative.
#[derive(Debug, Clone)]
pub struct ExponentialJitterBackoff {
    base: Duration,
    max: Duration,
    jitter_factor: f64,
}

impl ExponentialJitterBackoff {
    /// Creates the strategy with no jitter.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            jitter_factor: 0.0,
        }
    }

    /// Sets the jitter factor, clamped to `0.0..=1.0`.
    ///
    /// A factor of 0.1 spreads each delay over ±10% of its capped value.
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// The capped, un-jittered rung for `attempt`.
    pub fn raw_delay(&self, attempt: usize) -> Duration {
        if self.base.is_zero() {
            return Duration::ZERO;
        }
        // Cap in f64 space: `base * 2^attempt` overflows Duration long
        // before the exponent saturates.
        let factor = 2f64.powi(attempt.min(i32::MAX as usize) as i32);
        let secs = (self.base.as_secs_f64() * factor).min(self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

impl BackoffStrategy for ExponentialJitterBackoff {
    fn delay(&self, attempt: usize) -> Duration {
        let capped = self.raw_delay(attempt);
        if self.jitter_factor == 0.0 {
            return capped;
        }

        use rand::Rng;
        let mut rng = rand::rng();
        let spread = capped.as_secs_f64() * self.jitter_factor;
        let lo = capped.as_secs_f64() - spread;
        let hi = capped.as_secs_f64() + spread;
        let jittered = rng.random_range(lo..=hi);
        Duration::from_secs_f64(jittered.max(0.0))
    }
}
