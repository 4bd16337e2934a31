use crate::core::energy::EnergyError;
use crate::core::io::IoError;
use crate::core::models::ModelError;
use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid run configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Site {site} is already occupied (slab index {occupant})")]
    SiteOccupied { site: usize, occupant: usize },

    #[error("Site {site} is vacant; nothing to remove")]
    SiteVacant { site: usize },

    #[error("Site index {site} out of bounds for {num_sites} sites")]
    SiteOutOfBounds { site: usize, num_sites: usize },

    #[error(
        "Occupancy state desynchronized from slab: {matches} state entries map to slab index {slab_index}, expected exactly 1"
    )]
    StateDesync { slab_index: usize, matches: usize },

    #[error("Occupancy invariant violated: {0}")]
    Invariant(String),

    #[error("No eligible site for proposal: {0}")]
    NoEligibleSite(String),

    #[error("Canonical fill phase did not reach the target atom count after {attempts} trials")]
    FillDidNotConverge { attempts: usize },

    #[error("Energy oracle failed: {source}")]
    Energy {
        #[from]
        source: EnergyError,
    },

    #[error("Per-atom energies were required but the oracle did not provide them")]
    MissingPerAtomEnergies,

    #[error("Structural model error: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Failed to persist run artifacts: {source}")]
    Persistence {
        #[from]
        source: IoError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
