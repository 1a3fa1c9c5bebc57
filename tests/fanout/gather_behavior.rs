//! Report semantics under mixed source outcomes.

use std::sync::Arc;
use std::time::Duration;

use gather_resilience_core::SourceKind;
use gather_resilience_fanout::{
    Fanout, FailureReason, GatherError, GatherStatus, SourceOperation, SourceOutcome,
};
use gather_resilience_metrics::MetricsRecorder;

fn ok(name: &str, kind: SourceKind, value: &str) -> SourceOperation<String> {
    let value = value.to_string();
    SourceOperation::new(name, kind, async move { Ok::<_, String>(Some(value)) })
}

fn failing(name: &str, kind: SourceKind, message: &str) -> SourceOperation<String> {
    let message = message.to_string();
    SourceOperation::new(name, kind, async move {
        Err::<Option<String>, _>(message)
    })
}

#[tokio::test]
async fn failures_arrive_in_completion_order() {
    let fanout: Fanout<String> = Fanout::builder().build();
    let report = fanout
        .gather(vec![
            SourceOperation::new("slow-fail", SourceKind::Research, async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<Option<String>, _>("slow provider error".to_string())
            }),
            SourceOperation::new("fast-fail", SourceKind::Crm, async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Err::<Option<String>, _>("fast provider error".to_string())
            }),
        ])
        .await
        .unwrap();

    assert_eq!(report.status, GatherStatus::AllFailed);
    let order: Vec<&str> = report.failures.iter().map(|f| f.source.as_str()).collect();
    assert_eq!(order, ["fast-fail", "slow-fail"]);
}

#[tokio::test]
async fn partial_reports_stay_usable() {
    let fanout: Fanout<String> = Fanout::builder().build();
    let report = fanout
        .gather(vec![
            ok("crm", SourceKind::Crm, "contact history"),
            failing("research", SourceKind::Research, "provider 503"),
            SourceOperation::new("calendar", SourceKind::Calendar, async {
                Ok::<Option<String>, String>(None)
            }),
        ])
        .await
        .unwrap();

    assert_eq!(report.status, GatherStatus::Partial);
    assert!(report.is_usable());
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 2);
    assert_eq!(report.value("crm").unwrap(), "contact history");
    assert!(report.value("research").is_none());

    let reasons: Vec<FailureReason> = report.failures.iter().map(|f| f.reason).collect();
    assert!(reasons.contains(&FailureReason::Error));
    assert!(reasons.contains(&FailureReason::NotFound));
}

#[tokio::test]
async fn per_source_deadline_does_not_leak_into_siblings() {
    let fanout: Fanout<String> = Fanout::builder()
        .source_limit(Duration::from_millis(30))
        .build();
    let report = fanout
        .gather(vec![
            SourceOperation::new("stuck", SourceKind::Research, async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, String>(Some("never".to_string()))
            }),
            ok("crm", SourceKind::Crm, "contacts"),
        ])
        .await
        .unwrap();

    assert_eq!(report.status, GatherStatus::Partial);
    assert_eq!(report.value("crm").unwrap(), "contacts");
    match &report.outcomes["stuck"] {
        SourceOutcome::Failed { timed_out, .. } => assert!(timed_out),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn overall_budget_keeps_already_completed_results() {
    let fanout: Fanout<String> = Fanout::builder()
        .source_limit(Duration::from_secs(10))
        .overall_limit(Duration::from_millis(60))
        .build();
    let report = fanout
        .gather(vec![
            ok("crm", SourceKind::Crm, "contacts"),
            SourceOperation::new("research", SourceKind::Research, async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, String>(Some("notes".to_string()))
            }),
            SourceOperation::new("stuck", SourceKind::Calendar, async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, String>(Some("never".to_string()))
            }),
        ])
        .await
        .unwrap();

    assert_eq!(report.status, GatherStatus::Partial);
    assert_eq!(report.value("crm").unwrap(), "contacts");
    assert_eq!(report.value("research").unwrap(), "notes");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, "stuck");
    assert_eq!(report.failures[0].reason, FailureReason::Timeout);
    assert!(report.elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn duplicate_names_fail_fast() {
    let fanout: Fanout<String> = Fanout::builder().build();
    let err = fanout
        .gather(vec![
            ok("crm", SourceKind::Crm, "a"),
            ok("crm", SourceKind::Crm, "b"),
        ])
        .await
        .unwrap_err();
    assert_eq!(err, GatherError::DuplicateSource("crm".to_string()));
}

#[tokio::test]
async fn metrics_reflect_the_run() {
    let metrics = Arc::new(MetricsRecorder::new());
    let fanout: Fanout<String> = Fanout::builder()
        .metrics(Arc::clone(&metrics))
        .build();

    fanout
        .gather(vec![
            ok("crm", SourceKind::Crm, "contacts"),
            failing("research", SourceKind::Research, "boom"),
        ])
        .await
        .unwrap();
    fanout
        .gather(vec![ok("crm", SourceKind::Crm, "contacts")])
        .await
        .unwrap();

    let crm = metrics.source_stats("crm");
    assert_eq!(crm.attempts, 2);
    assert_eq!(crm.successes, 2);
    assert!((crm.rate - 1.0).abs() < f64::EPSILON);

    let research = metrics.source_stats("research");
    assert_eq!(research.attempts, 1);
    assert_eq!(research.failures, 1);
    assert!((research.rate - 0.0).abs() < f64::EPSILON);
}
