//! # Workflows Module
//!
//! High-level entry points composing the engine into complete procedures.
//!
//! A workflow owns the orchestration a caller would otherwise write by hand:
//! constructing the driver, running the schedule, and persisting artifacts.
//! The crate's library surface stays usable without them; they exist so the
//! CLI and library consumers share one battle-tested run path.

pub mod anneal;
