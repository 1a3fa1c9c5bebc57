//! Property tests for the retry loop.
//!
//! Invariants tested:
//! - The attempt budget is never exceeded
//! - An eventual success reports the exact attempt count
//! - Reported attempts always match actual invocations

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gather_resilience_core::{ClassifyContext, WorkflowStep};
use gather_resilience_retry::{with_retry, RetryConfig, RetryError};
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn config(max_attempts: usize) -> RetryConfig {
    RetryConfig::builder()
        .max_attempts(max_attempts)
        .fixed_backoff(Duration::from_millis(1))
        .build()
}

fn ctx() -> ClassifyContext {
    ClassifyContext::new(WorkflowStep::Delivery)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Property: a permanently failing operation is called exactly
    /// max_attempts times.
    #[test]
    fn budget_is_exact_under_permanent_failure(max_attempts in 1usize..=8) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let c = Arc::clone(&calls);

            let err = with_retry(&config(max_attempts), &ctx(), move |_| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("still broken")
                }
            })
            .await
            .unwrap_err();

            prop_assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
            prop_assert_eq!(err.attempts(), max_attempts);
            let exhausted = matches!(err, RetryError::ExhaustedRetries { .. });
            prop_assert!(exhausted);
            Ok(())
        })?;
    }

    /// Property: succeeding on attempt k reports exactly k+1 attempts and
    /// makes exactly k+1 calls, for any k inside the budget.
    #[test]
    fn eventual_success_reports_exact_attempts(
        max_attempts in 1usize..=8,
        succeed_on in 0usize..=7,
    ) {
        prop_assume!(succeed_on < max_attempts);

        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let c = Arc::clone(&calls);

            let outcome = with_retry(&config(max_attempts), &ctx(), move |attempt| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    if attempt < succeed_on {
                        Err("transient")
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await
            .unwrap();

            prop_assert_eq!(outcome.value, succeed_on);
            prop_assert_eq!(outcome.attempts, succeed_on + 1);
            prop_assert_eq!(calls.load(Ordering::SeqCst), succeed_on + 1);
            Ok(())
        })?;
    }
}
