use nalgebra::Point3;

/// Represents a single atom in a surface slab.
///
/// This struct holds the minimum information the Monte Carlo engine needs:
/// the chemical species and the Cartesian position in Angstroms. All heavier
/// per-atom data (force-field parameters, charges) belongs to the energy
/// oracle, not to the structural model.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol of the atom (e.g., "Cu", "O").
    pub species: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` of the given species at the given position.
    ///
    /// # Arguments
    ///
    /// * `species` - The element symbol of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(species: &str, position: Point3<f64>) -> Self {
        Self {
            species: species.to_string(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stores_species_and_position() {
        let atom = Atom::new("Cu", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.species, "Cu");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }
}
