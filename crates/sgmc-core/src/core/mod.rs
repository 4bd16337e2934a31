//! # Core Module
//!
//! Foundation layer of the SGMC library: stateless data models for slabs and
//! adsorption sites, the energy-oracle interface, geometry utilities, and
//! structure/history I/O. Nothing in this layer holds Monte Carlo state.

pub mod energy;
pub mod io;
pub mod models;
pub mod utils;
