use thiserror::Error;

/// Errors that abort a gather run before any source is started.
///
/// Failures of individual sources are never surfaced here; those land in
/// the [`GatherReport`](crate::GatherReport) instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatherError {
    /// Two source operations were registered under the same name.
    #[error("duplicate source name '{0}'")]
    DuplicateSource(String),
}
