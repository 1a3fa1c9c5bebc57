//! Listener registry shared by the pattern crates.
//!
//! Each pattern crate defines its own event enum and emits through an
//! [`EventListeners`] held in its config. Listeners are observational only;
//! a panicking listener never disturbs the pattern or its sibling listeners.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Trait implemented by the event enums of the pattern crates.
pub trait PatternEvent: Send + Sync + fmt::Debug {
    /// Stable identifier for the event variant (e.g. `"source_failed"`).
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the pattern instance that emitted the event.
    fn pattern_name(&self) -> &str;
}

/// Trait for receiving pattern events.
pub trait EventListener<E: PatternEvent>: Send + Sync {
    /// Called for every emitted event.
    fn on_event(&self, event: &E);
}

/// Registered set of listeners for one pattern instance.
pub struct EventListeners<E: PatternEvent> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: PatternEvent> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: PatternEvent> EventListeners<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Emits an event to every listener.
    ///
    /// A panic in one listener is caught so the remaining listeners still run.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    /// Returns `true` if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E: PatternEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter turning a closure into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _marker: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps a closure as a listener.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: PatternEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
