//! Retry loop tests.
//!
//! Test organization:
//! - behavior.rs: attempt budget, recovery, classification-driven stops
//! - scheduling.rs: delay selection between ladder and suggested delays
//! - escalation.rs: terminal-failure notifications

mod escalation;
