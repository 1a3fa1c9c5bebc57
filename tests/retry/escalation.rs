//! Terminal-failure notifications.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gather_resilience_core::{ClassifyContext, SourceKind, WorkflowStep};
use gather_resilience_retry::{with_retry, RecordingNotifier, RetryConfig};

fn ctx() -> ClassifyContext {
    ClassifyContext::new(WorkflowStep::Delivery).with_source(SourceKind::Messaging)
}

fn escalating_config(notifier: Arc<RecordingNotifier>) -> RetryConfig {
    RetryConfig::builder()
        .name("send-connection-request")
        .max_attempts(2)
        .fixed_backoff(Duration::from_millis(2))
        .escalate_to(notifier, "#gtm-alerts")
        .build()
}

#[tokio::test]
async fn success_sends_nothing() {
    let notifier = Arc::new(RecordingNotifier::new());
    let config = escalating_config(Arc::clone(&notifier));

    let outcome = with_retry(&config, &ctx(), |_| async { Ok::<_, &str>("sent") }).await;
    assert!(outcome.is_ok());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn recovery_before_exhaustion_sends_nothing() {
    let notifier = Arc::new(RecordingNotifier::new());
    let config = escalating_config(Arc::clone(&notifier));

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let outcome = with_retry(&config, &ctx(), move |_| {
        let c = Arc::clone(&c);
        async move {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("connection reset")
            } else {
                Ok("sent")
            }
        }
    })
    .await;

    assert!(outcome.is_ok());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn exhaustion_sends_one_operator_readable_message() {
    let notifier = Arc::new(RecordingNotifier::new());
    let config = escalating_config(Arc::clone(&notifier));

    let _ = with_retry(&config, &ctx(), |_| async {
        Err::<(), _>("heyreach 502 bad gateway")
    })
    .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let (channel, message) = &sent[0];
    assert_eq!(channel, "#gtm-alerts");
    assert!(message.contains("send-connection-request"));
    assert!(message.contains("delivery"));
    assert!(message.contains("2 attempt(s)"));
    // Both audiences: the operator summary and the raw detail.
    assert!(message.contains("heyreach 502 bad gateway"));
    assert!(message.contains("messaging provider"));
}

#[tokio::test]
async fn non_retryable_failure_also_escalates_once() {
    let notifier = Arc::new(RecordingNotifier::new());
    let config = escalating_config(Arc::clone(&notifier));

    let _ = with_retry(&config, &ctx(), |_| async {
        Err::<(), _>("401 unauthorized")
    })
    .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("1 attempt(s)"));
}
