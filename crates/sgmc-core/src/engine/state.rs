use super::error::EngineError;
use crate::core::models::site::SiteLattice;
use crate::core::models::slab::Slab;
use std::collections::{BTreeMap, HashSet};

/// Occupancy bookkeeping mapping adsorption sites to the atoms occupying them.
///
/// Each entry is either vacant or holds the *current positional index* of the
/// occupying atom in the slab. Because slab removal shifts the indices of all
/// subsequently stored atoms, this state must be renumbered in lockstep with
/// every removal; [`super::mutator::SlabMutator`] is the only component that
/// mutates either side. The index-stability contract is therefore: occupant
/// indices are valid only between mutations, and every removal at slab index
/// `k` decrements all stored indices greater than `k` by one.
///
/// Invariants (checked by [`SiteState::check_invariants`]):
/// - all occupant indices are pairwise distinct and within slab bounds,
/// - the number of occupied sites equals `slab.len() - pristine_atoms`.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteState {
    occupancy: Vec<Option<usize>>,
    pristine_atoms: usize,
}

impl SiteState {
    /// Creates an all-vacant state for `num_sites` sites over a pristine slab
    /// of `pristine_atoms` atoms.
    pub fn new(num_sites: usize, pristine_atoms: usize) -> Self {
        Self {
            occupancy: vec![None; num_sites],
            pristine_atoms,
        }
    }

    /// Returns the number of sites tracked.
    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    /// Returns `true` if no sites are tracked.
    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    /// Returns the atom count of the pristine (adsorbate-free) slab.
    pub fn pristine_atoms(&self) -> usize {
        self.pristine_atoms
    }

    /// Returns the slab index of the atom occupying `site`, or `None` if the
    /// site is vacant or out of bounds.
    pub fn occupant(&self, site: usize) -> Option<usize> {
        self.occupancy.get(site).copied().flatten()
    }

    /// Returns `true` if `site` is occupied.
    pub fn is_occupied(&self, site: usize) -> bool {
        self.occupant(site).is_some()
    }

    /// Returns the number of occupied sites.
    pub fn num_adsorbed(&self) -> usize {
        self.occupancy.iter().filter(|o| o.is_some()).count()
    }

    /// Returns the indices of all occupied sites.
    pub fn occupied_sites(&self) -> Vec<usize> {
        self.occupancy
            .iter()
            .enumerate()
            .filter_map(|(site, o)| o.map(|_| site))
            .collect()
    }

    /// Returns the indices of all vacant sites.
    pub fn vacant_sites(&self) -> Vec<usize> {
        self.occupancy
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_none())
            .map(|(site, _)| site)
            .collect()
    }

    /// Counts occupied sites bucketed by connectivity class, with zero entries
    /// for every class present in the lattice.
    pub fn coverage(&self, sites: &SiteLattice) -> BTreeMap<u32, usize> {
        let mut counts: BTreeMap<u32, usize> =
            sites.classes().into_iter().map(|c| (c, 0)).collect();
        for (site, occupant) in self.occupancy.iter().enumerate() {
            if occupant.is_some() {
                if let Some(s) = sites.site(site) {
                    *counts.entry(s.connectivity).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    pub(crate) fn set(&mut self, site: usize, slab_index: usize) {
        self.occupancy[site] = Some(slab_index);
    }

    pub(crate) fn clear(&mut self, site: usize) {
        self.occupancy[site] = None;
    }

    /// Decrements every stored index greater than `removed`, preserving the
    /// index-consistency invariant after a slab removal.
    pub(crate) fn renumber_after_removal(&mut self, removed: usize) {
        for occupant in self.occupancy.iter_mut() {
            if let Some(index) = occupant {
                if *index > removed {
                    *index -= 1;
                }
            }
        }
    }

    /// Counts how many state entries map to the given slab index.
    pub(crate) fn count_mapping_to(&self, slab_index: usize) -> usize {
        self.occupancy
            .iter()
            .filter(|o| **o == Some(slab_index))
            .count()
    }

    /// Verifies the occupancy invariants against the current slab.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Invariant`] describing the first violation found.
    pub fn check_invariants(&self, slab: &Slab) -> Result<(), EngineError> {
        let mut seen = HashSet::new();
        for (site, occupant) in self.occupancy.iter().enumerate() {
            if let Some(index) = occupant {
                if *index >= slab.len() {
                    return Err(EngineError::Invariant(format!(
                        "site {site} maps to slab index {index}, but slab has {} atoms",
                        slab.len()
                    )));
                }
                if !seen.insert(*index) {
                    return Err(EngineError::Invariant(format!(
                        "slab index {index} is referenced by more than one site"
                    )));
                }
            }
        }
        let expected = slab.len().checked_sub(self.pristine_atoms).ok_or_else(|| {
            EngineError::Invariant(format!(
                "slab has {} atoms, fewer than the {} pristine atoms",
                slab.len(),
                self.pristine_atoms
            ))
        })?;
        if seen.len() != expected {
            return Err(EngineError::Invariant(format!(
                "{} occupied sites but slab carries {} adsorbate atoms",
                seen.len(),
                expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::slab::Cell;
    use nalgebra::{Point3, Vector3};

    fn slab(n: usize) -> Slab {
        let atoms = (0..n)
            .map(|i| Atom::new("Cu", Point3::new(i as f64, 0.0, 0.0)))
            .collect();
        Slab::new(atoms, Cell::slab(Vector3::new(10.0, 10.0, 30.0)))
    }

    #[test]
    fn fresh_state_is_all_vacant_and_consistent() {
        let state = SiteState::new(4, 8);
        assert_eq!(state.num_adsorbed(), 0);
        assert_eq!(state.vacant_sites(), vec![0, 1, 2, 3]);
        state.check_invariants(&slab(8)).unwrap();
    }

    #[test]
    fn renumber_shifts_only_higher_indices() {
        let mut state = SiteState::new(3, 8);
        state.set(0, 8);
        state.set(1, 9);
        state.set(2, 10);
        state.renumber_after_removal(9);
        assert_eq!(state.occupant(0), Some(8));
        assert_eq!(state.occupant(1), Some(9));
        assert_eq!(state.occupant(2), Some(9));
    }

    #[test]
    fn duplicate_occupants_violate_invariants() {
        let mut state = SiteState::new(2, 8);
        state.set(0, 8);
        state.set(1, 8);
        let err = state.check_invariants(&slab(10)).unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
    }

    #[test]
    fn adsorbate_count_must_match_slab_growth() {
        let mut state = SiteState::new(2, 8);
        state.set(0, 8);
        // Slab grew by two atoms but only one site is occupied.
        let err = state.check_invariants(&slab(10)).unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
        state.check_invariants(&slab(9)).unwrap();
    }

    #[test]
    fn coverage_buckets_by_connectivity_class() {
        let positions = (0..4).map(|i| Point3::new(i as f64, 0.0, 5.0)).collect();
        let sites = SiteLattice::new(positions, vec![1, 1, 4, 4]).unwrap();
        let mut state = SiteState::new(4, 8);
        state.set(0, 8);
        state.set(2, 9);
        let coverage = state.coverage(&sites);
        assert_eq!(coverage.get(&1), Some(&1));
        assert_eq!(coverage.get(&4), Some(&1));
    }
}
