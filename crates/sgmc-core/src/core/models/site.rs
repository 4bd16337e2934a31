use super::ModelError;
use nalgebra::Point3;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Named adsorption-site geometries with their conventional coordination numbers.
///
/// The connectivity class of a site is the number of substrate atoms it
/// coordinates to: an on-top site sits above a single atom, a bridge site
/// between two, and a fourfold hollow site between four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SiteKind {
    /// On-top site, directly above one substrate atom.
    Top,
    /// Bridge site, between two substrate atoms.
    Bridge,
    /// Fourfold hollow site.
    Hollow,
}

impl SiteKind {
    /// Returns the coordination number conventionally assigned to this kind.
    pub fn connectivity(self) -> u32 {
        match self {
            SiteKind::Top => 1,
            SiteKind::Bridge => 2,
            SiteKind::Hollow => 4,
        }
    }
}

impl FromStr for SiteKind {
    type Err = ();

    /// Parses a string into a `SiteKind`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "on-top" | "ontop" => Ok(SiteKind::Top),
            "bridge" => Ok(SiteKind::Bridge),
            "hollow" => Ok(SiteKind::Hollow),
            _ => Err(()),
        }
    }
}

/// Represents a single candidate adsorption site on a slab surface.
///
/// Sites are enumerated once at initialization by the geometry provider and
/// are immutable for the lifetime of a run. Each site is a fixed coordinate
/// where at most one adsorbate atom may bind, plus its connectivity class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsorptionSite {
    /// The fixed binding coordinate of the site in Angstroms.
    pub position: Point3<f64>,
    /// The connectivity class (coordination number) of the site.
    pub connectivity: u32,
}

/// The validated, immutable collection of adsorption sites for one slab.
///
/// Construction fails if the connectivity list does not match the coordinate
/// list one-to-one; downstream occupancy bookkeeping is indexed by position in
/// this collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLattice {
    sites: Vec<AdsorptionSite>,
}

impl SiteLattice {
    /// Creates a site lattice from parallel coordinate and connectivity lists.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ConnectivityMismatch`] if the lists differ in length.
    pub fn new(positions: Vec<Point3<f64>>, connectivities: Vec<u32>) -> Result<Self, ModelError> {
        if positions.len() != connectivities.len() {
            return Err(ModelError::ConnectivityMismatch {
                connectivities: connectivities.len(),
                sites: positions.len(),
            });
        }
        let sites = positions
            .into_iter()
            .zip(connectivities)
            .map(|(position, connectivity)| AdsorptionSite {
                position,
                connectivity,
            })
            .collect();
        Ok(Self { sites })
    }

    /// Creates a site lattice where every site shares one connectivity class.
    ///
    /// This mirrors the common case of user-supplied site coordinates without
    /// connectivity information.
    pub fn uniform(positions: Vec<Point3<f64>>, connectivity: u32) -> Self {
        let sites = positions
            .into_iter()
            .map(|position| AdsorptionSite {
                position,
                connectivity,
            })
            .collect();
        Self { sites }
    }

    /// Returns the number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns `true` if no sites were enumerated.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Retrieves a site by its index.
    pub fn site(&self, index: usize) -> Option<&AdsorptionSite> {
        self.sites.get(index)
    }

    /// Returns an iterator over all sites in index order.
    pub fn iter(&self) -> impl Iterator<Item = &AdsorptionSite> {
        self.sites.iter()
    }

    /// Returns the set of distinct connectivity classes present.
    pub fn classes(&self) -> BTreeSet<u32> {
        self.sites.iter().map(|s| s.connectivity).collect()
    }

    /// Returns the indices of all sites in the given connectivity class.
    pub fn indices_of_class(&self, connectivity: u32) -> Vec<usize> {
        self.sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.connectivity == connectivity)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(n: usize) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 5.0)).collect()
    }

    #[test]
    fn site_kind_connectivity_follows_convention() {
        assert_eq!(SiteKind::Top.connectivity(), 1);
        assert_eq!(SiteKind::Bridge.connectivity(), 2);
        assert_eq!(SiteKind::Hollow.connectivity(), 4);
    }

    #[test]
    fn site_kind_parses_case_insensitively() {
        assert_eq!("Top".parse::<SiteKind>(), Ok(SiteKind::Top));
        assert_eq!("HOLLOW".parse::<SiteKind>(), Ok(SiteKind::Hollow));
        assert!("fourfold".parse::<SiteKind>().is_err());
    }

    #[test]
    fn new_rejects_mismatched_connectivity() {
        let err = SiteLattice::new(positions(3), vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ConnectivityMismatch {
                connectivities: 2,
                sites: 3
            }
        ));
    }

    #[test]
    fn classes_and_class_indices_are_consistent() {
        let lattice = SiteLattice::new(positions(4), vec![1, 4, 1, 2]).unwrap();
        assert_eq!(lattice.classes().into_iter().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(lattice.indices_of_class(1), vec![0, 2]);
        assert_eq!(lattice.indices_of_class(4), vec![1]);
    }

    #[test]
    fn uniform_assigns_one_class_everywhere() {
        let lattice = SiteLattice::uniform(positions(3), 1);
        assert_eq!(lattice.len(), 3);
        assert!(lattice.iter().all(|s| s.connectivity == 1));
    }
}
