use super::atom::Atom;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;

/// An orthorhombic simulation cell with per-axis periodicity flags.
///
/// Surface slabs are conventionally periodic in the two in-plane directions
/// and open along the surface normal (where the vacuum layer lives).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Edge lengths of the cell in Angstroms.
    pub lengths: Vector3<f64>,
    /// Whether each axis is treated as periodic.
    pub periodic: [bool; 3],
}

impl Cell {
    /// Creates a cell periodic in x and y with an open z axis, the standard
    /// setup for a surface slab with vacuum along z.
    pub fn slab(lengths: Vector3<f64>) -> Self {
        Self {
            lengths,
            periodic: [true, true, false],
        }
    }

    /// Creates a fully non-periodic cell (isolated cluster geometry).
    pub fn isolated(lengths: Vector3<f64>) -> Self {
        Self {
            lengths,
            periodic: [false, false, false],
        }
    }
}

/// Represents a crystal surface slab: an ordered collection of atoms plus a cell.
///
/// Atoms are identified by their positional index in the underlying vector.
/// Appending an atom gives it index `len() - 1`; removing an atom at index `i`
/// shifts every atom with index greater than `i` down by one. This positional
/// identity contract is what the engine's occupancy bookkeeping relies on, so
/// callers that mirror slab indices elsewhere must renumber on removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Slab {
    atoms: Vec<Atom>,
    cell: Cell,
}

impl Slab {
    /// Creates a new slab from a list of atoms and a cell.
    pub fn new(atoms: Vec<Atom>, cell: Cell) -> Self {
        Self { atoms, cell }
    }

    /// Returns the number of atoms in the slab.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` if the slab contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the simulation cell.
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// Retrieves an immutable reference to an atom by its positional index.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Returns an iterator over all atoms in positional order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    /// Returns a mutable iterator over all atoms in positional order.
    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.iter_mut()
    }

    /// Appends an atom to the slab and returns its new positional index.
    pub fn push(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Removes and returns the atom at `index`.
    ///
    /// Every atom with a larger index is shifted down by one, changing its
    /// positional identity.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, mirroring `Vec::remove`.
    pub fn remove(&mut self, index: usize) -> Atom {
        self.atoms.remove(index)
    }

    /// Returns the atom count per species, ordered by symbol.
    pub fn composition(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.species.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Returns the positions of all atoms in positional order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|a| a.position).collect()
    }
}
