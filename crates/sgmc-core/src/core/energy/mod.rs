//! # Energy Module
//!
//! The boundary between the Monte Carlo engine and the atomistic energy model.
//!
//! The engine is force-field-agnostic: it talks to any [`EnergyOracle`], which
//! evaluates a slab (optionally after geometric relaxation) and reports an
//! energy plus whatever auxiliary quantities the model can provide. A simple
//! Lennard-Jones oracle ([`pair::LennardJones`]) is included so the crate is
//! runnable and testable without an external calculator, and
//! [`offset::OffsetCorrector`] turns raw model energies into referenced,
//! formation-energy-like quantities.

pub mod offset;
pub mod pair;

use crate::core::models::slab::Slab;
use thiserror::Error;

/// Errors produced by energy oracles and energy post-processing.
#[derive(Debug, Error)]
pub enum EnergyError {
    /// The underlying model could not evaluate the structure.
    #[error("energy evaluation failed: {0}")]
    Evaluation(String),

    /// The oracle has no parameters for a species present in the slab.
    #[error("no energy parameters for species: {0}")]
    MissingParameters(String),

    /// Offset-correction reference data is absent or inconsistent.
    #[error("invalid offset-correction reference data: {0}")]
    OffsetReference(String),

    /// Reading tabulated reference data failed.
    #[error("failed to read reference data: {source}")]
    ReferenceIo {
        #[from]
        source: csv::Error,
    },
}

/// The result of one energy evaluation.
///
/// `energy` is always present; the remaining fields are model-dependent and
/// reported as `None` when the oracle cannot provide them. When `relax` was
/// requested and the oracle performed it, `relaxed` carries the relaxed
/// structure and `energy` refers to that structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Total energy of the (possibly relaxed) structure.
    pub energy: f64,
    /// One-sigma uncertainty of the energy, for models that estimate it.
    pub energy_std: Option<f64>,
    /// Largest per-atom force norm in the evaluated structure.
    pub max_force: Option<f64>,
    /// One-sigma uncertainty of the forces.
    pub force_std: Option<f64>,
    /// Per-atom energy decomposition, in slab order.
    pub per_atom_energies: Option<Vec<f64>>,
    /// The relaxed structure, when relaxation was performed.
    pub relaxed: Option<Slab>,
}

impl Evaluation {
    /// Creates an evaluation carrying only a total energy.
    pub fn from_energy(energy: f64) -> Self {
        Self {
            energy,
            energy_std: None,
            max_force: None,
            force_std: None,
            per_atom_energies: None,
            relaxed: None,
        }
    }
}

/// An atomistic energy model the engine can query repeatedly.
///
/// Implementations must be callable any number of times without retaining
/// mutable state across calls beyond what the slab itself encodes; internal
/// caches are fine, hidden dependence on call order is not. Evaluation is a
/// synchronous blocking call; a slow model simply delays the trial.
pub trait EnergyOracle {
    /// Evaluates the slab, relaxing it first if `relax` is set and the model
    /// supports relaxation.
    fn evaluate(&mut self, slab: &Slab, relax: bool) -> Result<Evaluation, EnergyError>;
}
