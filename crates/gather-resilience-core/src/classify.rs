//! Pure failure classification.
//!
//! [`classify`] is the single place heterogeneous upstream failures become
//! policy-bearing [`ClassifiedError`] values. It is synchronous, total, and
//! stateless: the same raw failure and context always produce the same kind
//! and retry decision.

use crate::error::{ClassifiedError, ErrorKind, RawFailure};

/// External systems the workflow integrates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// CRM (contacts, companies, deals).
    Crm,
    /// Company research provider.
    Research,
    /// Calendar provider.
    Calendar,
    /// Outbound messaging (campaign/chat channels).
    Messaging,
    /// LLM provider.
    Llm,
}

impl SourceKind {
    /// Stable identifier, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Crm => "crm",
            SourceKind::Research => "research",
            SourceKind::Calendar => "calendar",
            SourceKind::Messaging => "messaging",
            SourceKind::Llm => "llm",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical steps of the workflow, used when no source is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStep {
    /// Fan-out context gathering ahead of a meeting brief.
    ContextGathering,
    /// Brief generation.
    Generation,
    /// Delivering a result to a downstream channel.
    Delivery,
    /// Reply analysis.
    Analysis,
    /// Writing a classification back to the CRM.
    CrmUpdate,
    /// Processing calendar events.
    CalendarProcessing,
    /// An operator-initiated request.
    ManualRequest,
}

impl WorkflowStep {
    /// Stable identifier, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::ContextGathering => "context_gathering",
            WorkflowStep::Generation => "generation",
            WorkflowStep::Delivery => "delivery",
            WorkflowStep::Analysis => "analysis",
            WorkflowStep::CrmUpdate => "crm_update",
            WorkflowStep::CalendarProcessing => "calendar_processing",
            WorkflowStep::ManualRequest => "manual_request",
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a failure happened, fed to [`classify`] alongside the raw error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyContext {
    /// The workflow step that was executing.
    pub operation: WorkflowStep,
    /// The external system involved, when one is known.
    pub source: Option<SourceKind>,
    /// Zero-indexed attempt number, when classification happens inside a
    /// retry loop.
    pub retry_count: Option<usize>,
    /// Attempt budget of that retry loop.
    pub max_retries: Option<usize>,
}

impl ClassifyContext {
    /// Context for a failure in the given workflow step.
    pub fn new(operation: WorkflowStep) -> Self {
        Self {
            operation,
            source: None,
            retry_count: None,
            max_retries: None,
        }
    }

    /// Attributes the failure to a specific external system.
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = Some(source);
        self
    }

    /// Records retry-loop position, surfaced in the technical message.
    pub fn with_attempts(mut self, retry_count: usize, max_retries: usize) -> Self {
        self.retry_count = Some(retry_count);
        self.max_retries = Some(max_retries);
        self
    }
}

// Substring predicates, checked against the lowercased message in order.
// First match wins.
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline", "etimedout"];
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "rate-limit", "too many requests", "429"];
const AUTH_MARKERS: &[&str] = &[
    "unauthorized",
    "forbidden",
    "invalid api key",
    "authentication",
    "401",
    "403",
];

fn matches_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

/// Maps a raw failure plus context to a [`ClassifiedError`].
///
/// Matching order: timeout / rate-limit / auth markers in the message, then
/// the source named in the context, then the workflow step, then
/// [`ErrorKind::Internal`]. Every branch produces an operator-facing
/// `user_message` distinct from the technical `message`. A server-supplied
/// delay carried on the [`RawFailure`] replaces the kind's default
/// suggestion.
pub fn classify(raw: impl Into<RawFailure>, ctx: &ClassifyContext) -> ClassifiedError {
    let raw = raw.into();
    let err = classify_message(&raw, ctx);
    match raw.retry_after() {
        Some(delay) => err.with_retry_after(delay),
        None => err,
    }
}

fn classify_message(raw: &RawFailure, ctx: &ClassifyContext) -> ClassifiedError {
    let lowered = raw.message().to_lowercase();
    let message = technical_message(raw, ctx);

    if matches_any(&lowered, TIMEOUT_MARKERS) {
        return ClassifiedError::new(
            ErrorKind::Timeout,
            message,
            "The request took too long to complete and will be retried.".to_string(),
        );
    }
    if matches_any(&lowered, RATE_LIMIT_MARKERS) {
        return ClassifiedError::new(
            ErrorKind::RateLimited,
            message,
            "An external service is throttling requests; retrying shortly.".to_string(),
        );
    }
    if matches_any(&lowered, AUTH_MARKERS) {
        return ClassifiedError::new(
            ErrorKind::Unauthorized,
            message,
            "Access to an external service was denied. Check the integration credentials."
                .to_string(),
        );
    }

    if let Some(source) = ctx.source {
        let (kind, user_message) = match source {
            SourceKind::Crm => (
                ErrorKind::Crm,
                "The CRM could not be reached; recent contact data may be missing.",
            ),
            SourceKind::Research => (
                ErrorKind::Research,
                "Company research is temporarily unavailable; the brief may be thinner than usual.",
            ),
            SourceKind::Calendar => (
                ErrorKind::Calendar,
                "Calendar data could not be loaded right now.",
            ),
            SourceKind::Messaging => (
                ErrorKind::Messaging,
                "The messaging provider is unavailable; campaign data may be incomplete.",
            ),
            SourceKind::Llm => (
                ErrorKind::Llm,
                "The language model did not respond; generation will be retried.",
            ),
        };
        return ClassifiedError::new(kind, message, user_message.to_string());
    }

    let (kind, user_message) = match ctx.operation {
        WorkflowStep::ContextGathering => (
            ErrorKind::ContextGathering,
            "Some background sources were unavailable; the brief was built from partial context.",
        ),
        WorkflowStep::Generation => (
            ErrorKind::Generation,
            "The brief could not be generated and will be retried.",
        ),
        WorkflowStep::Delivery => (
            ErrorKind::Delivery,
            "The result could not be delivered yet; delivery will be retried.",
        ),
        WorkflowStep::Analysis => (
            ErrorKind::Analysis,
            "The reply could not be analyzed and will be retried.",
        ),
        WorkflowStep::CrmUpdate => (
            ErrorKind::CrmUpdate,
            "The CRM record was not updated; the change will be retried.",
        ),
        WorkflowStep::CalendarProcessing => (
            ErrorKind::CalendarProcessing,
            "Calendar events could not be processed and will be retried.",
        ),
        WorkflowStep::ManualRequest => (
            ErrorKind::ManualRequest,
            "Your request could not be completed; please try again.",
        ),
    };
    ClassifiedError::new(kind, message, user_message.to_string())
}

fn technical_message(raw: &RawFailure, ctx: &ClassifyContext) -> String {
    match (ctx.retry_count, ctx.max_retries) {
        (Some(count), Some(max)) => {
            format!("{} (attempt {} of {})", raw.message(), count + 1, max)
        }
        _ => raw.message().to_string(),
    }
}
