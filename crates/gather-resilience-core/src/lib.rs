//! Shared building blocks for the `gather-resilience` crates.
//!
//! This crate carries the pieces every pattern crate needs:
//!
//! - [`classify`]: a pure, total mapping from any raw failure to a
//!   [`ClassifiedError`] carrying retry policy and an operator-facing message.
//! - [`events`]: a small listener registry so pattern instances can report
//!   what they did without taking a logging dependency.
//! - [`clock`]: an injectable time source, so TTL and expiry logic stays
//!   testable with fixed time.
//!
//! # Classifying a failure
//!
//! ```
//! use gather_resilience_core::{classify, ClassifyContext, ErrorKind, SourceKind, WorkflowStep};
//!
//! let ctx = ClassifyContext::new(WorkflowStep::ContextGathering).with_source(SourceKind::Crm);
//! let err = classify("connection reset by peer", &ctx);
//!
//! assert_eq!(err.kind, ErrorKind::Crm);
//! assert!(err.retryable);
//! assert_ne!(err.user_message, err.message);
//! ```

pub mod clock;
pub mod events;

mod classify;
mod error;

pub use classify::{classify, ClassifyContext, SourceKind, WorkflowStep};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ClassifiedError, ErrorKind, RawFailure};
