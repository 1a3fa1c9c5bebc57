use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use gather_resilience_core::{RawFailure, SourceKind};

/// A named fetch against one upstream source.
///
/// The future is lazy: building a `SourceOperation` performs no work, and
/// an operation shadowed by a cache hit is dropped without ever being
/// polled. `Ok(None)` means the fetch completed but the subject does not
/// exist upstream, which is reported as `not_found` rather than an error.
pub struct SourceOperation<V> {
    pub(crate) name: String,
    pub(crate) kind: SourceKind,
    pub(crate) fut: BoxFuture<'static, Result<Option<V>, RawFailure>>,
}

impl<V> SourceOperation<V> {
    pub fn new<F, E>(name: impl Into<String>, kind: SourceKind, fut: F) -> Self
    where
        F: Future<Output = Result<Option<V>, E>> + Send + 'static,
        E: Into<RawFailure>,
    {
        SourceOperation {
            name: name.into(),
            kind,
            fut: Box::pin(async move { fut.await.map_err(Into::into) }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

impl<V> fmt::Debug for SourceOperation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceOperation")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
