//! # Molecular Models Module
//!
//! Data models for the atomistic structures the Monte Carlo engine operates on:
//! atoms, the surface slab, enumerated adsorption sites, and a simple geometry
//! provider for constructing pristine slabs.
//!
//! ## Organization
//!
//! - **Elements** ([`element`]) - Static periodic-table data (atomic numbers, masses)
//! - **Atoms** ([`atom`]) - Chemical species plus Cartesian position
//! - **Slabs** ([`slab`]) - Ordered atom collections with an orthorhombic cell
//! - **Sites** ([`site`]) - Immutable adsorption-site lattices with connectivity classes
//! - **Lattices** ([`lattice`]) - Geometry providers building slab + site pairs

pub mod atom;
pub mod element;
pub mod lattice;
pub mod site;
pub mod slab;

use thiserror::Error;

/// Errors arising from construction or validation of the structural models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The per-site connectivity list does not match the site coordinate list.
    #[error("connectivity list has {connectivities} entries but {sites} site coordinates were given")]
    ConnectivityMismatch {
        /// Number of connectivity entries supplied.
        connectivities: usize,
        /// Number of site coordinates supplied.
        sites: usize,
    },

    /// A chemical species symbol is not present in the element table.
    #[error("unknown element symbol: {0}")]
    UnknownElement(String),

    /// A geometry provider was asked to build a degenerate structure.
    #[error("invalid lattice geometry: {0}")]
    InvalidGeometry(String),
}
