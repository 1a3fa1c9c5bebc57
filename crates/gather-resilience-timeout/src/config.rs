//! Deadline configuration and builder.

use crate::events::DeadlineEvent;
use crate::Deadline;
use gather_resilience_core::events::{EventListeners, FnListener};
use std::sync::Arc;
use std::time::Duration;

/// Default per-operation deadline.
pub const DEFAULT_LIMIT: Duration = Duration::from_secs(30);

/// Configuration for a [`Deadline`].
pub struct DeadlineConfig {
    pub(crate) limit: Duration,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<DeadlineEvent>,
}

/// Builder for [`DeadlineConfig`].
pub struct DeadlineConfigBuilder {
    limit: Duration,
    name: String,
    event_listeners: EventListeners<DeadlineEvent>,
}

impl Default for DeadlineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadlineConfigBuilder {
    /// Creates a builder with the defaults: 30s limit, `"<unnamed>"` name.
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            name: "<unnamed>".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the deadline.
    pub fn limit(mut self, limit: Duration) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the instance name, used as the label on timeout failures and in
    /// events.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for operations settling successfully in time.
    ///
    /// The callback receives the operation's elapsed time.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let DeadlineEvent::Success { elapsed, .. } = event {
                f(*elapsed);
            }
        }));
        self
    }

    /// Registers a callback for operations failing on their own in time.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let DeadlineEvent::Error { elapsed, .. } = event {
                f(*elapsed);
            }
        }));
        self
    }

    /// Registers a callback for the deadline firing.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, DeadlineEvent::Timeout { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the [`Deadline`].
    pub fn build(self) -> Deadline {
        Deadline::from_config(Arc::new(DeadlineConfig {
            limit: self.limit,
            name: self.name,
            event_listeners: self.event_listeners,
        }))
    }
}
