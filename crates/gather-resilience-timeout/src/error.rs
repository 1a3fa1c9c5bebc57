//! Error type for deadline-wrapped operations.

use std::time::Duration;

/// Failure of a deadline-wrapped operation.
///
/// `Elapsed` is the deadline firing; `Inner` is the operation's own failure
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeadlineError<E> {
    /// The operation did not settle before the deadline.
    #[error("'{label}' exceeded its {limit:?} deadline")]
    Elapsed {
        /// Label of the wrapped operation.
        label: String,
        /// The deadline that fired.
        limit: Duration,
    },
    /// The operation settled with its own failure before the deadline.
    #[error("{0}")]
    Inner(E),
}

impl<E> DeadlineError<E> {
    /// Returns `true` if the deadline fired.
    pub fn is_elapsed(&self) -> bool {
        matches!(self, DeadlineError::Elapsed { .. })
    }

    /// Extracts the operation's own failure, if there was one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            DeadlineError::Inner(e) => Some(e),
            DeadlineError::Elapsed { .. } => None,
        }
    }
}
