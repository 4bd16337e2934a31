use crate::core::models::slab::Slab;
use crate::core::utils::geometry;
use tracing::trace;

/// Geometric move validation by interatomic distance.
///
/// An external collaborator from the engine's point of view: given the
/// post-move slab, it answers whether the configuration is geometrically
/// acceptable. The verdict is deterministic, not probabilistic.
pub trait DistanceFilter {
    /// Returns `true` if no restricted-species atom sits closer than `cutoff`
    /// to another restricted-species atom.
    fn is_valid(&self, slab: &Slab, restricted: &[String], cutoff: f64) -> bool;
}

/// The default pairwise minimum-distance filter.
///
/// Checks every pair of atoms whose species both appear in the restricted
/// list, using the minimum-image convention of the slab cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinDistanceFilter;

impl DistanceFilter for MinDistanceFilter {
    fn is_valid(&self, slab: &Slab, restricted: &[String], cutoff: f64) -> bool {
        let positions: Vec<_> = slab
            .atoms_iter()
            .filter(|atom| restricted.iter().any(|s| *s == atom.species))
            .map(|atom| atom.position)
            .collect();

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let distance = geometry::distance(&positions[i], &positions[j], slab.cell());
                if distance < cutoff {
                    trace!(i, j, distance, cutoff, "distance filter rejection");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::slab::Cell;
    use nalgebra::{Point3, Vector3};

    fn slab(adsorbate_positions: &[[f64; 3]]) -> Slab {
        let mut atoms = vec![Atom::new("Cu", Point3::new(5.0, 5.0, 0.0))];
        for p in adsorbate_positions {
            atoms.push(Atom::new("O", Point3::new(p[0], p[1], p[2])));
        }
        Slab::new(atoms, Cell::slab(Vector3::new(10.0, 10.0, 30.0)))
    }

    fn restricted() -> Vec<String> {
        vec!["O".to_string()]
    }

    #[test]
    fn accepts_well_separated_adsorbates() {
        let slab = slab(&[[1.0, 1.0, 3.0], [5.0, 5.0, 3.0]]);
        assert!(MinDistanceFilter.is_valid(&slab, &restricted(), 2.0));
    }

    #[test]
    fn rejects_close_contacts() {
        let slab = slab(&[[1.0, 1.0, 3.0], [2.0, 1.0, 3.0]]);
        assert!(!MinDistanceFilter.is_valid(&slab, &restricted(), 2.0));
    }

    #[test]
    fn rejects_contacts_across_the_periodic_boundary() {
        let slab = slab(&[[0.5, 5.0, 3.0], [9.5, 5.0, 3.0]]);
        assert!(!MinDistanceFilter.is_valid(&slab, &restricted(), 2.0));
    }

    #[test]
    fn ignores_unrestricted_species() {
        // The substrate atom sits within cutoff of an adsorbate but is not
        // restricted, so the configuration is still valid.
        let slab = slab(&[[5.0, 5.0, 1.0]]);
        assert!(MinDistanceFilter.is_valid(&slab, &restricted(), 2.0));
    }
}
