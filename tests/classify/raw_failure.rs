//! Failure normalization from heterogeneous error shapes.

use gather_resilience_core::{classify, ClassifyContext, ErrorKind, RawFailure, WorkflowStep};

fn ctx() -> ClassifyContext {
    ClassifyContext::new(WorkflowStep::Generation)
}

#[test]
fn string_and_str_failures_keep_their_message() {
    assert_eq!(RawFailure::from("boom").message(), "boom");
    assert_eq!(RawFailure::from("boom".to_string()).message(), "boom");
}

#[test]
fn io_errors_are_normalized() {
    let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timed out");
    let err = classify(RawFailure::from(io), &ctx());
    assert_eq!(err.kind, ErrorKind::Timeout);
}

#[test]
fn boxed_errors_are_normalized() {
    let boxed: Box<dyn std::error::Error + Send + Sync> = "429 too many requests".into();
    let err = classify(RawFailure::from(boxed), &ctx());
    assert_eq!(err.kind, ErrorKind::RateLimited);
}

#[test]
fn blank_messages_become_unknown_error() {
    for raw in ["", "   "] {
        let failure = RawFailure::from(raw);
        assert_eq!(failure.message(), "unknown error");
    }
}

#[test]
fn display_only_types_are_accepted() {
    let failure = RawFailure::from_display(std::fmt::Error);
    let err = classify(failure, &ctx());
    assert_eq!(err.kind, ErrorKind::Generation);
}

#[test]
fn attempt_counters_appear_in_the_technical_message() {
    let err = classify("llm refused", &ctx().with_attempts(2, 3));
    assert_eq!(err.message, "llm refused (attempt 3 of 3)");
    assert!(!err.user_message.contains("attempt"));
}
