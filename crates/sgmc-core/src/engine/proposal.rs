use super::config::SpeciesPolicy;
use super::error::EngineError;
use super::state::SiteState;
use crate::core::models::site::SiteLattice;
use crate::core::models::slab::Slab;
use rand::prelude::*;

/// A proposed occupancy transition, alive for the duration of one trial.
///
/// Single-site flips ([`Move::Add`], [`Move::Remove`]) change the adsorbate
/// count by one and are the grand-canonical move set; [`Move::Exchange`] swaps
/// an occupant from one site to a vacant site and conserves the adsorbate
/// count by construction (the canonical move set).
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    /// Adsorb an atom of `species` at the vacant site `site`.
    Add { site: usize, species: String },
    /// Desorb the atom of `species` occupying `site`.
    Remove { site: usize, species: String },
    /// Move the occupant of `from` to the vacant site `to`.
    Exchange {
        from: usize,
        to: usize,
        species: String,
    },
}

impl Move {
    /// Returns the move that exactly undoes this one.
    pub fn inverse(&self) -> Move {
        match self {
            Move::Add { site, species } => Move::Remove {
                site: *site,
                species: species.clone(),
            },
            Move::Remove { site, species } => Move::Add {
                site: *site,
                species: species.clone(),
            },
            Move::Exchange { from, to, species } => Move::Exchange {
                from: *to,
                to: *from,
                species: species.clone(),
            },
        }
    }

    /// Returns the per-species change in adsorbate count this move causes.
    ///
    /// Exchanges conserve composition and report no deltas, which is what
    /// makes their chemical-potential term vanish in the acceptance weight.
    pub fn species_deltas(&self) -> Vec<(&str, i32)> {
        match self {
            Move::Add { species, .. } => vec![(species.as_str(), 1)],
            Move::Remove { species, .. } => vec![(species.as_str(), -1)],
            Move::Exchange { .. } => Vec::new(),
        }
    }
}

/// Generates candidate moves from the current occupancy.
///
/// All randomness flows through the caller-supplied RNG, so a fixed seed gives
/// a reproducible proposal stream.
#[derive(Debug, Clone)]
pub struct MoveProposer {
    adsorbates: Vec<String>,
    policy: SpeciesPolicy,
    class_restriction: Option<u32>,
    round_robin: usize,
}

impl MoveProposer {
    /// Creates a proposer for the configured adsorbate species.
    ///
    /// # Arguments
    ///
    /// * `adsorbates` - Candidate species for `Add` moves; must be non-empty.
    /// * `policy` - How a species is chosen among multiple adsorbates.
    /// * `class_restriction` - If set, flips only target sites of this
    ///   connectivity class.
    pub fn new(
        adsorbates: Vec<String>,
        policy: SpeciesPolicy,
        class_restriction: Option<u32>,
    ) -> Self {
        Self {
            adsorbates,
            policy,
            class_restriction,
            round_robin: 0,
        }
    }

    /// Proposes a grand-canonical single-site flip: a uniformly drawn site
    /// becomes an `Add` if vacant and a `Remove` if occupied.
    pub fn propose_flip(
        &mut self,
        slab: &Slab,
        state: &SiteState,
        sites: &SiteLattice,
        rng: &mut impl Rng,
    ) -> Result<Move, EngineError> {
        let site = match self.class_restriction {
            Some(class) => {
                let candidates = sites.indices_of_class(class);
                *candidates.choose(rng).ok_or_else(|| {
                    EngineError::NoEligibleSite(format!(
                        "no sites with connectivity class {class}"
                    ))
                })?
            }
            None => {
                if sites.is_empty() {
                    return Err(EngineError::NoEligibleSite(
                        "site lattice is empty".to_string(),
                    ));
                }
                rng.gen_range(0..sites.len())
            }
        };

        match state.occupant(site) {
            Some(slab_index) => {
                let atom = slab.atom(slab_index).ok_or(EngineError::Invariant(format!(
                    "site {site} maps to out-of-bounds slab index {slab_index}"
                )))?;
                Ok(Move::Remove {
                    site,
                    species: atom.species.clone(),
                })
            }
            None => Ok(Move::Add {
                site,
                species: self.next_species(rng),
            }),
        }
    }

    /// Proposes a canonical pair exchange between a uniformly drawn occupied
    /// site and a uniformly drawn vacant site.
    pub fn propose_exchange(
        &mut self,
        slab: &Slab,
        state: &SiteState,
        rng: &mut impl Rng,
    ) -> Result<Move, EngineError> {
        let occupied = state.occupied_sites();
        let vacant = state.vacant_sites();
        let from = *occupied.choose(rng).ok_or_else(|| {
            EngineError::NoEligibleSite("no occupied site to exchange from".to_string())
        })?;
        let to = *vacant.choose(rng).ok_or_else(|| {
            EngineError::NoEligibleSite("no vacant site to exchange into".to_string())
        })?;

        let slab_index = state.occupant(from).ok_or(EngineError::Internal(
            "occupied site lost its occupant mid-proposal".to_string(),
        ))?;
        let atom = slab.atom(slab_index).ok_or(EngineError::Invariant(format!(
            "site {from} maps to out-of-bounds slab index {slab_index}"
        )))?;
        Ok(Move::Exchange {
            from,
            to,
            species: atom.species.clone(),
        })
    }

    fn next_species(&mut self, rng: &mut impl Rng) -> String {
        match self.policy {
            SpeciesPolicy::First => self.adsorbates[0].clone(),
            SpeciesPolicy::Uniform => {
                let index = rng.gen_range(0..self.adsorbates.len());
                self.adsorbates[index].clone()
            }
            SpeciesPolicy::RoundRobin => {
                let species = self.adsorbates[self.round_robin % self.adsorbates.len()].clone();
                self.round_robin += 1;
                species
            }
        }
    }
}
