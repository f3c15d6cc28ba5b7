//! Resilience subsystem.
//!
//! # Responsibilities
//! - Bound single calls by a timeout
//! - Stop work promptly on cancellation
//!
//! Broadcasts are never retried: a transaction is sent exactly once.

pub mod race;

pub use race::{race, RaceOutcome};
