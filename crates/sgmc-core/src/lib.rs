//! # SGMC Core Library
//!
//! A semi-grand canonical Monte Carlo (SGMC) engine for sampling equilibrium
//! adsorbate configurations on crystal surface slabs, driven by an atomistic
//! energy model and a simulated-annealing temperature schedule.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models ([`core::models::slab::Slab`],
//!   [`core::models::site::SiteLattice`]), the energy-oracle interface and reference
//!   implementations, geometry utilities, and structure/history I/O.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer implements the Markov chain
//!   itself: occupancy bookkeeping (`SiteState`), lockstep slab mutation with exact
//!   rollback (`SlabMutator`), move proposal, the acceptance test, the annealing
//!   schedule, and the sweep state machine (`SweepDriver`).
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It ties
//!   the `engine` and `core` together to execute a complete annealing run, including
//!   snapshot and history persistence.

pub mod core;
pub mod engine;
pub mod workflows;
