//! Escalation notification sink.

use futures::future::BoxFuture;

/// Failure to deliver a notification.
///
/// Only ever logged; escalation is out-of-band and must not disturb the
/// retried operation's result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Sink for terminal-failure escalations (e.g. a human-facing channel).
pub trait Notifier: Send + Sync {
    /// Delivers `message` to `channel`.
    fn notify(&self, channel: &str, message: &str) -> BoxFuture<'_, Result<(), NotifyError>>;
}

/// Notifier for tests and for wiring retries without an escalation path:
/// records messages, always succeeds.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, as `(channel, message)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, channel: &str, message: &str) -> BoxFuture<'_, Result<(), NotifyError>> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((channel.to_string(), message.to_string()));
        Box::pin(async { Ok(()) })
    }
}
