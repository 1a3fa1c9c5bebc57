//! The classified-error type and failure normalization.

use std::fmt;
use std::time::Duration;

/// Closed set of failure categories the rest of the system dispatches on.
///
/// Three layers, matched in order by [`classify`](crate::classify):
/// message-derived kinds (`Timeout`, `RateLimited`, `Unauthorized`), one kind
/// per integrated external system, one kind per workflow step, and an
/// `Internal` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation did not settle before its deadline.
    Timeout,
    /// An upstream service is throttling us.
    RateLimited,
    /// Credentials were rejected. Never retryable.
    Unauthorized,
    /// CRM lookup or write failed.
    Crm,
    /// Company research provider failed.
    Research,
    /// Calendar provider failed.
    Calendar,
    /// Outbound messaging provider failed.
    Messaging,
    /// LLM invocation failed.
    Llm,
    /// Failure during the context-gathering step.
    ContextGathering,
    /// Failure during brief generation.
    Generation,
    /// Failure delivering a result downstream.
    Delivery,
    /// Failure during reply analysis.
    Analysis,
    /// Failure writing back to the CRM.
    CrmUpdate,
    /// Failure processing calendar events.
    CalendarProcessing,
    /// Failure handling an operator-initiated request.
    ManualRequest,
    /// Anything not matched above.
    Internal,
}

impl ErrorKind {
    /// Default retry eligibility for this kind.
    ///
    /// Only `Unauthorized` is terminally non-retryable; everything else is a
    /// transient condition or is indistinguishable from one.
    pub fn default_retryable(self) -> bool {
        !matches!(self, ErrorKind::Unauthorized)
    }

    /// Suggested delay before the next attempt, where the kind implies one.
    ///
    /// Kinds without a suggestion defer to the caller's backoff ladder.
    pub fn default_retry_after(self) -> Option<Duration> {
        match self {
            ErrorKind::RateLimited => Some(Duration::from_secs(10)),
            ErrorKind::Crm | ErrorKind::Calendar | ErrorKind::Messaging => {
                Some(Duration::from_secs(5))
            }
            ErrorKind::Research => Some(Duration::from_secs(15)),
            ErrorKind::Llm => Some(Duration::from_secs(10)),
            _ => None,
        }
    }

    /// Stable identifier, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Crm => "crm",
            ErrorKind::Research => "research",
            ErrorKind::Calendar => "calendar",
            ErrorKind::Messaging => "messaging",
            ErrorKind::Llm => "llm",
            ErrorKind::ContextGathering => "context_gathering",
            ErrorKind::Generation => "generation",
            ErrorKind::Delivery => "delivery",
            ErrorKind::Analysis => "analysis",
            ErrorKind::CrmUpdate => "crm_update",
            ErrorKind::CalendarProcessing => "calendar_processing",
            ErrorKind::ManualRequest => "manual_request",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure with a policy decision attached.
///
/// Produced once by [`classify`](crate::classify) and never mutated. `Display`
/// renders the operator-facing message; the technical detail is only exposed
/// through [`ClassifiedError::detailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedError {
    /// Category the failure was filed under.
    pub kind: ErrorKind,
    /// Technical message extracted from the raw failure.
    pub message: String,
    /// Message suitable for a non-technical operator. Always distinct from
    /// `message`.
    pub user_message: String,
    /// Whether another attempt is worthwhile.
    pub retryable: bool,
    /// Delay suggested by the classifier (or by the failing service itself,
    /// e.g. a `Retry-After` header), if any.
    pub retry_after: Option<Duration>,
}

impl ClassifiedError {
    pub(crate) fn new(kind: ErrorKind, message: String, user_message: String) -> Self {
        Self {
            kind,
            message,
            user_message,
            retryable: kind.default_retryable(),
            retry_after: kind.default_retry_after(),
        }
    }

    /// Overrides the suggested delay, e.g. from a server-supplied
    /// `Retry-After` value.
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// Returns `true` if the failure was a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Operator message plus technical detail, for a "technical details"
    /// display mode.
    pub fn detailed(&self) -> String {
        format!("{} [{}: {}]", self.user_message, self.kind, self.message)
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message)
    }
}

/// Canonical form of an arbitrary raw failure.
///
/// Upstream integrations fail in any shape: typed errors, strings, payloads
/// with a `message` field. Everything is squeezed into `{message}` here, at
/// the classification boundary, so the rest of the system deals with exactly
/// one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFailure {
    message: String,
    retry_after: Option<Duration>,
}

impl RawFailure {
    /// Builds a raw failure from any message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.trim().is_empty() {
                "unknown error".to_string()
            } else {
                message
            },
            retry_after: None,
        }
    }

    /// Builds a raw failure from anything printable, typed errors included.
    pub fn from_display(err: impl fmt::Display) -> Self {
        Self::new(err.to_string())
    }

    /// Attaches a server-supplied delay, e.g. a parsed `Retry-After` header.
    ///
    /// [`classify`](crate::classify) carries it onto the resulting
    /// [`ClassifiedError`], where it takes precedence over the kind's
    /// default suggestion.
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// The extracted message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The server-supplied delay, if one was attached.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

impl fmt::Display for RawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for RawFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for RawFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for RawFailure {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for RawFailure {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}
