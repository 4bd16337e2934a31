use super::atom::Atom;
use super::element;
use super::site::{SiteKind, SiteLattice};
use super::slab::{Cell, Slab};
use super::ModelError;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Builds the initial pristine slab and its enumerated adsorption sites.
///
/// The Monte Carlo engine never constructs geometry itself; it consumes
/// whatever slab/site pair a provider hands it. Implementations may wrap an
/// external surface-generation tool or, like [`SquareLattice`], build a simple
/// parametric structure directly.
pub trait GeometryProvider {
    /// Constructs the pristine slab and the full list of adsorption sites.
    fn build(&self) -> Result<(Slab, SiteLattice), ModelError>;
}

/// A parametric fcc(100)-like slab builder.
///
/// Layers are square grids with in-plane spacing `a/sqrt(2)`, stacked with the
/// alternating half-cell offset of fcc(100) and separated by `a/2`. Adsorption
/// sites are enumerated on the top layer only: one on-top site above each
/// surface atom and one fourfold hollow site per grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareLattice {
    /// Element symbol of the substrate (e.g., "Cu").
    pub element: String,
    /// The cubic lattice parameter in Angstroms.
    pub lattice_constant: f64,
    /// In-plane repetitions (nx, ny) and the number of layers.
    pub size: (usize, usize, usize),
    /// Vacuum added above the top layer along z, in Angstroms.
    pub vacuum: f64,
    /// Height of the enumerated sites above the top layer, in Angstroms.
    pub site_height: f64,
}

impl SquareLattice {
    fn validate(&self) -> Result<(), ModelError> {
        if !element::is_known(&self.element) {
            return Err(ModelError::UnknownElement(self.element.clone()));
        }
        let (nx, ny, layers) = self.size;
        if nx == 0 || ny == 0 || layers == 0 {
            return Err(ModelError::InvalidGeometry(
                "slab size must be nonzero in every direction".to_string(),
            ));
        }
        if self.lattice_constant <= 0.0 {
            return Err(ModelError::InvalidGeometry(format!(
                "lattice constant must be positive, got {}",
                self.lattice_constant
            )));
        }
        Ok(())
    }
}

impl GeometryProvider for SquareLattice {
    fn build(&self) -> Result<(Slab, SiteLattice), ModelError> {
        self.validate()?;

        let (nx, ny, layers) = self.size;
        let spacing = self.lattice_constant / 2.0_f64.sqrt();
        let layer_gap = self.lattice_constant / 2.0;
        let top_z = (layers - 1) as f64 * layer_gap;

        let mut atoms = Vec::with_capacity(nx * ny * layers);
        for layer in 0..layers {
            // fcc(100) stacking: every other layer is offset by half a cell.
            let offset = if layer % 2 == 0 { 0.0 } else { spacing / 2.0 };
            let z = layer as f64 * layer_gap;
            for i in 0..nx {
                for j in 0..ny {
                    let position = Point3::new(
                        i as f64 * spacing + offset,
                        j as f64 * spacing + offset,
                        z,
                    );
                    atoms.push(Atom::new(&self.element, position));
                }
            }
        }

        let cell = Cell::slab(Vector3::new(
            nx as f64 * spacing,
            ny as f64 * spacing,
            top_z + self.vacuum,
        ));

        let top_offset = if (layers - 1) % 2 == 0 {
            0.0
        } else {
            spacing / 2.0
        };
        let mut positions = Vec::with_capacity(2 * nx * ny);
        let mut connectivities = Vec::with_capacity(2 * nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let x = i as f64 * spacing + top_offset;
                let y = j as f64 * spacing + top_offset;
                positions.push(Point3::new(x, y, top_z + self.site_height));
                connectivities.push(SiteKind::Top.connectivity());
                positions.push(Point3::new(
                    x + spacing / 2.0,
                    y + spacing / 2.0,
                    top_z + self.site_height,
                ));
                connectivities.push(SiteKind::Hollow.connectivity());
            }
        }

        let sites = SiteLattice::new(positions, connectivities)?;
        debug!(
            atoms = atoms.len(),
            sites = sites.len(),
            "built square lattice slab"
        );
        Ok((Slab::new(atoms, cell), sites))
    }
}
