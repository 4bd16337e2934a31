//! # Engine Module
//!
//! The Monte Carlo logic core: a Markov chain over site-occupancy states of a
//! surface slab, sampled in the canonical or semi-grand canonical ensemble
//! under a simulated-annealing temperature schedule.
//!
//! ## Overview
//!
//! One *trial* proposes a move (a single-site adsorption/desorption flip or an
//! occupied-to-vacant pair exchange), applies it tentatively to the slab, asks
//! the acceptance engine for a verdict, and either commits the mutation or
//! rolls it back exactly. `N_sites` trials form one *sweep*; after each sweep
//! the temperature is annealed and observables are recorded.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - The fully enumerated, validated run configuration
//! - **Occupancy State** ([`state`]) - Site-to-slab-index bookkeeping and its invariants
//! - **Mutation** ([`mutator`]) - Lockstep slab/state mutation with exact inverses
//! - **Proposal** ([`proposal`]) - Ensemble-aware random move generation
//! - **Acceptance** ([`acceptance`]) - Metropolis test, geometric filtering, testing mode
//! - **Annealing** ([`schedule`]) - The geometric temperature schedule
//! - **Filtering** ([`filter`]) - Distance-based geometric move validation
//! - **Progress** ([`progress`]) - Progress reporting callbacks
//! - **Driving** ([`driver`]) - The sweep state machine and run bookkeeping
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Execution is single-threaded and strictly sequential: each trial's verdict
//! depends on the energy baseline established by the previous committed trial.
//! Independent chains (e.g., temperature replicas) are separate engine
//! instances with disjoint random seeds, orchestrated by the caller.

pub mod acceptance;
pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod mutator;
pub mod progress;
pub mod proposal;
pub mod schedule;
pub mod state;
