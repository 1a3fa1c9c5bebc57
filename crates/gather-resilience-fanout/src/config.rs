//! Configuration for [`Fanout`](crate::Fanout).

use std::sync::Arc;
use std::time::Duration;

use gather_resilience_cache::ResearchCache;
use gather_resilience_core::events::{EventListeners, FnListener};
use gather_resilience_core::WorkflowStep;
use gather_resilience_metrics::MetricsRecorder;
use gather_resilience_timeout::DEFAULT_LIMIT;

use crate::events::FanoutEvent;
use crate::report::{FailureReason, GatherStatus};
use crate::Fanout;

/// Ties one source name to a cache lookup key. A fresh entry under the key
/// shadows the source; a fetched value is written back under the same key.
pub(crate) struct CacheBinding<V> {
    pub(crate) source: String,
    pub(crate) key: String,
    pub(crate) cache: ResearchCache<V>,
}

pub struct FanoutConfig<V> {
    pub(crate) name: String,
    pub(crate) operation: WorkflowStep,
    pub(crate) source_limit: Duration,
    pub(crate) overall_limit: Option<Duration>,
    pub(crate) metrics: Option<Arc<MetricsRecorder>>,
    pub(crate) cache: Option<CacheBinding<V>>,
    pub(crate) event_listeners: EventListeners<FanoutEvent>,
}

/// Builder for [`FanoutConfig`].
pub struct FanoutConfigBuilder<V> {
    name: String,
    operation: WorkflowStep,
    source_limit: Duration,
    overall_limit: Option<Duration>,
    metrics: Option<Arc<MetricsRecorder>>,
    cache: Option<CacheBinding<V>>,
    event_listeners: EventListeners<FanoutEvent>,
}

impl<V: Send + Sync> FanoutConfigBuilder<V> {
    pub(crate) fn new() -> Self {
        Self {
            name: "fanout".to_string(),
            operation: WorkflowStep::ContextGathering,
            source_limit: DEFAULT_LIMIT,
            overall_limit: None,
            metrics: None,
            cache: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Instance name carried on events and used as the latency category
    /// for the run as a whole.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Workflow step used when classifying source failures. Defaults to
    /// [`WorkflowStep::ContextGathering`].
    pub fn operation(mut self, operation: WorkflowStep) -> Self {
        self.operation = operation;
        self
    }

    /// Deadline applied to each source independently. Defaults to
    /// [`DEFAULT_LIMIT`].
    pub fn source_limit(mut self, limit: Duration) -> Self {
        self.source_limit = limit;
        self
    }

    /// Optional budget for the whole run. Sources still pending when it
    /// expires are dropped and reported as timeouts; completed sources
    /// keep their results.
    pub fn overall_limit(mut self, limit: Duration) -> Self {
        self.overall_limit = Some(limit);
        self
    }

    /// Records per-source outcomes and latencies on `recorder`.
    pub fn metrics(mut self, recorder: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(recorder);
        self
    }

    /// Serves the source named `source` from `cache` under `key` when a
    /// fresh entry exists, and writes its fetched value back on a miss.
    pub fn cache_source(
        mut self,
        source: impl Into<String>,
        key: impl Into<String>,
        cache: ResearchCache<V>,
    ) -> Self {
        self.cache = Some(CacheBinding {
            source: source.into(),
            key: key.into(),
            cache,
        });
        self
    }

    /// Called when a fresh cached value shadows its bound source.
    pub fn on_cache_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &FanoutEvent| {
                if let FanoutEvent::CacheHit { key, .. } = event {
                    f(key);
                }
            }));
        self
    }

    /// Called once per source that produced a value.
    pub fn on_source_succeeded<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &FanoutEvent| {
                if let FanoutEvent::SourceSucceeded { source, .. } = event {
                    f(source);
                }
            }));
        self
    }

    /// Called once per source that contributed nothing.
    pub fn on_source_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, FailureReason) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &FanoutEvent| {
                if let FanoutEvent::SourceFailed { source, reason, .. } = event {
                    f(source, *reason);
                }
            }));
        self
    }

    /// Called when the run finishes, with its status and wall time.
    pub fn on_completed<F>(mut self, f: F) -> Self
    where
        F: Fn(GatherStatus, Duration) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &FanoutEvent| {
                if let FanoutEvent::Completed {
                    status, elapsed, ..
                } = event
                {
                    f(*status, *elapsed);
                }
            }));
        self
    }

    /// Builds the [`Fanout`].
    pub fn build(self) -> Fanout<V> {
        Fanout::from_config(Arc::new(FanoutConfig {
            name: self.name,
            operation: self.operation,
            source_limit: self.source_limit,
            overall_limit: self.overall_limit,
            metrics: self.metrics,
            cache: self.cache,
            event_listeners: self.event_listeners,
        }))
    }
}
