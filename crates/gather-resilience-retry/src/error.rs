//! Terminal results of a retry-wrapped call.

use gather_resilience_core::ClassifiedError;

/// Definitive failure of a retry-wrapped call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetryError {
    /// Every attempt in the budget failed with a retryable error.
    #[error("retries exhausted after {attempts} attempts: {error}")]
    ExhaustedRetries {
        /// Classification of the last failure.
        error: ClassifiedError,
        /// Attempts made, equal to the configured budget.
        attempts: usize,
    },
    /// A failure was classified non-retryable; remaining budget unused.
    #[error("not retryable after {attempts} attempts: {error}")]
    NotRetryable {
        /// Classification of the terminal failure.
        error: ClassifiedError,
        /// Attempts made before giving up.
        attempts: usize,
    },
}

impl RetryError {
    /// The classification of the terminal failure.
    pub fn classified(&self) -> &ClassifiedError {
        match self {
            RetryError::ExhaustedRetries { error, .. } | RetryError::NotRetryable { error, .. } => {
                error
            }
        }
    }

    /// Attempts made before the call failed for good.
    pub fn attempts(&self) -> usize {
        match self {
            RetryError::ExhaustedRetries { attempts, .. }
            | RetryError::NotRetryable { attempts, .. } => *attempts,
        }
    }
}
