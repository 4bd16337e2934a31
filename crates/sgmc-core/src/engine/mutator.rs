use super::error::EngineError;
use super::proposal::Move;
use super::state::SiteState;
use crate::core::models::atom::Atom;
use crate::core::models::site::SiteLattice;
use crate::core::models::slab::Slab;
use tracing::trace;

/// Applies occupancy changes to the slab and the site state in lockstep.
///
/// This is the only component allowed to mutate either side; a trial that
/// touched one without the other would desynchronize the index bookkeeping.
/// `add` and `remove` are exact inverses at the occupancy level: composition
/// and the set of occupied sites are restored by the inverse operation. Atom
/// *ordering* among chemically equivalent adsorbates is not necessarily
/// reproduced, because a rollback re-appends the removed atom at the end of
/// the slab; the invariants in [`SiteState`] are indifferent to that
/// permutation.
pub struct SlabMutator<'a> {
    slab: &'a mut Slab,
    state: &'a mut SiteState,
    sites: &'a SiteLattice,
}

impl<'a> SlabMutator<'a> {
    pub fn new(slab: &'a mut Slab, state: &'a mut SiteState, sites: &'a SiteLattice) -> Self {
        Self { slab, state, sites }
    }

    /// Adsorbs an atom of `species` at the fixed coordinate of `site`.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::SiteOccupied`] if the site already holds an
    /// atom, or [`EngineError::SiteOutOfBounds`] for an unknown site index.
    pub fn add(&mut self, site: usize, species: &str) -> Result<(), EngineError> {
        let coordinate = self
            .sites
            .site(site)
            .ok_or(EngineError::SiteOutOfBounds {
                site,
                num_sites: self.sites.len(),
            })?
            .position;
        if let Some(occupant) = self.state.occupant(site) {
            return Err(EngineError::SiteOccupied { site, occupant });
        }

        let index = self.slab.push(Atom::new(species, coordinate));
        self.state.set(site, index);
        trace!(site, index, species, "adsorbed atom");
        Ok(())
    }

    /// Desorbs the atom occupying `site` and returns its species.
    ///
    /// Every state entry referencing a slab index greater than the removed
    /// one is decremented to preserve index consistency.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::SiteVacant`] if the site holds no atom, and
    /// with [`EngineError::StateDesync`] if anything other than exactly one
    /// state entry maps to the removed slab index.
    pub fn remove(&mut self, site: usize) -> Result<String, EngineError> {
        if site >= self.sites.len() {
            return Err(EngineError::SiteOutOfBounds {
                site,
                num_sites: self.sites.len(),
            });
        }
        let slab_index = self
            .state
            .occupant(site)
            .ok_or(EngineError::SiteVacant { site })?;

        let matches = self.state.count_mapping_to(slab_index);
        if matches != 1 {
            return Err(EngineError::StateDesync {
                slab_index,
                matches,
            });
        }
        if slab_index >= self.slab.len() {
            return Err(EngineError::StateDesync {
                slab_index,
                matches: 0,
            });
        }

        let atom = self.slab.remove(slab_index);
        self.state.clear(site);
        self.state.renumber_after_removal(slab_index);
        trace!(site, slab_index, species = %atom.species, "desorbed atom");
        Ok(atom.species)
    }

    /// Applies a proposed move as a tentative mutation.
    ///
    /// An exchange is a `remove` from the source site followed by an `add` at
    /// the destination, so it conserves the total atom count.
    pub fn apply(&mut self, mv: &Move) -> Result<(), EngineError> {
        match mv {
            Move::Add { site, species } => self.add(*site, species),
            Move::Remove { site, .. } => self.remove(*site).map(|_| ()),
            Move::Exchange { from, to, species } => {
                self.remove(*from)?;
                self.add(*to, species)
            }
        }
    }

    /// Rolls back a previously applied move by applying its exact inverse.
    pub fn rollback(&mut self, mv: &Move) -> Result<(), EngineError> {
        self.apply(&mv.inverse())
    }
}
