use super::EnergyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Per-element linear regression coefficients correcting the raw model energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementCoefficients {
    /// Slope applied per atom of the element.
    pub slope: f64,
    /// Intercept applied per atom of the element.
    pub intercept: f64,
}

/// One row of the tabulated offset-correction reference data.
#[derive(Debug, Deserialize)]
struct ReferenceRow {
    element: String,
    slope: f64,
    intercept: f64,
    bulk_energy: f64,
    ratio: f64,
}

/// The structured reference record required for offset correction.
///
/// All maps are keyed by element symbol. `stoichiometry` holds the target
/// ratio of each element's count to the reference element's count in the
/// stoichiometric bulk (e.g., O:Ti = 3 in SrTiO3 with Ti as reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetReference {
    /// Regression coefficients per element.
    pub coefficients: BTreeMap<String, ElementCoefficients>,
    /// Bulk reference energy per atom for each element.
    pub bulk_energies: BTreeMap<String, f64>,
    /// Target stoichiometric ratio relative to the reference element.
    pub stoichiometry: BTreeMap<String, f64>,
    /// The element every stoichiometric ratio is expressed against.
    pub reference_element: String,
}

impl OffsetReference {
    /// Loads reference data from a CSV table with columns
    /// `element,slope,intercept,bulk_energy,ratio`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or if `reference_element`
    /// does not appear in the table.
    pub fn from_csv(path: &Path, reference_element: &str) -> Result<Self, EnergyError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut coefficients = BTreeMap::new();
        let mut bulk_energies = BTreeMap::new();
        let mut stoichiometry = BTreeMap::new();
        for row in reader.deserialize() {
            let row: ReferenceRow = row?;
            coefficients.insert(
                row.element.clone(),
                ElementCoefficients {
                    slope: row.slope,
                    intercept: row.intercept,
                },
            );
            bulk_energies.insert(row.element.clone(), row.bulk_energy);
            stoichiometry.insert(row.element, row.ratio);
        }
        let reference = Self {
            coefficients,
            bulk_energies,
            stoichiometry,
            reference_element: reference_element.to_string(),
        };
        reference.validate()?;
        Ok(reference)
    }

    /// Checks internal consistency of the record.
    pub fn validate(&self) -> Result<(), EnergyError> {
        if !self.stoichiometry.contains_key(&self.reference_element) {
            return Err(EnergyError::OffsetReference(format!(
                "reference element {} missing from stoichiometry table",
                self.reference_element
            )));
        }
        Ok(())
    }
}

/// Transforms raw model energies into referenced formation-energy-like values.
///
/// The correction has three parts, each summed over the slab composition:
/// a per-element linear recalibration of the raw energy, subtraction of bulk
/// reference energies, and subtraction of the chemical-reservoir term
/// `(n_e - ratio_e * n_ref) * mu_e` for every element with a configured
/// chemical potential. Elements absent from a table contribute nothing to the
/// corresponding term.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetCorrector {
    reference: OffsetReference,
}

impl OffsetCorrector {
    /// Creates a corrector, validating the reference record.
    pub fn new(reference: OffsetReference) -> Result<Self, EnergyError> {
        reference.validate()?;
        Ok(Self { reference })
    }

    /// Returns the underlying reference record.
    pub fn reference(&self) -> &OffsetReference {
        &self.reference
    }

    /// Applies the correction to a raw energy for the given composition.
    pub fn correct(
        &self,
        raw: f64,
        composition: &BTreeMap<String, usize>,
        chemical_potentials: &BTreeMap<String, f64>,
    ) -> f64 {
        let count = |element: &str| -> f64 {
            composition.get(element).copied().unwrap_or(0) as f64
        };

        let mut corrected = raw;
        for (element, coeff) in &self.reference.coefficients {
            let n = count(element);
            if n > 0.0 {
                corrected += coeff.slope * n + coeff.intercept;
            }
        }
        for (element, bulk) in &self.reference.bulk_energies {
            corrected -= count(element) * bulk;
        }

        let n_ref = count(&self.reference.reference_element);
        for (element, mu) in chemical_potentials {
            if element == &self.reference.reference_element {
                continue;
            }
            let Some(ratio) = self.reference.stoichiometry.get(element) else {
                continue;
            };
            corrected -= (count(element) - ratio * n_ref) * mu;
        }

        debug!(raw, corrected, "applied offset correction");
        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn reference() -> OffsetReference {
        let mut coefficients = BTreeMap::new();
        coefficients.insert(
            "O".to_string(),
            ElementCoefficients {
                slope: 0.1,
                intercept: 0.0,
            },
        );
        let mut bulk_energies = BTreeMap::new();
        bulk_energies.insert("O".to_string(), -2.0);
        bulk_energies.insert("Ti".to_string(), -5.0);
        let mut stoichiometry = BTreeMap::new();
        stoichiometry.insert("O".to_string(), 3.0);
        stoichiometry.insert("Ti".to_string(), 1.0);
        OffsetReference {
            coefficients,
            bulk_energies,
            stoichiometry,
            reference_element: "Ti".to_string(),
        }
    }

    fn composition(o: usize, ti: usize) -> BTreeMap<String, usize> {
        let mut comp = BTreeMap::new();
        comp.insert("O".to_string(), o);
        comp.insert("Ti".to_string(), ti);
        comp
    }

    #[test]
    fn stoichiometric_slab_has_zero_reservoir_term() {
        let corrector = OffsetCorrector::new(reference()).unwrap();
        let mut pots = BTreeMap::new();
        pots.insert("O".to_string(), 1.5);

        // 3 O per Ti: the reservoir term vanishes; only regression and bulk remain.
        let corrected = corrector.correct(0.0, &composition(6, 2), &pots);
        let expected = 0.1 * 6.0 - (6.0 * -2.0 + 2.0 * -5.0);
        assert_relative_eq!(corrected, expected, epsilon = 1e-12);
    }

    #[test]
    fn off_stoichiometry_pays_the_chemical_potential() {
        let corrector = OffsetCorrector::new(reference()).unwrap();
        let mut pots = BTreeMap::new();
        pots.insert("O".to_string(), 1.5);

        let balanced = corrector.correct(0.0, &composition(6, 2), &pots);
        let excess = corrector.correct(0.0, &composition(7, 2), &pots);
        // One extra O atom: regression slope 0.1, bulk -2.0, reservoir -1.5.
        assert_relative_eq!(excess - balanced, 0.1 + 2.0 - 1.5, epsilon = 1e-12);
    }

    #[test]
    fn missing_reference_element_is_rejected() {
        let mut bad = reference();
        bad.reference_element = "Sr".to_string();
        assert!(matches!(
            OffsetCorrector::new(bad),
            Err(EnergyError::OffsetReference(_))
        ));
    }

    #[test]
    fn from_csv_parses_reference_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "element,slope,intercept,bulk_energy,ratio").unwrap();
        writeln!(file, "O,0.1,0.0,-2.0,3.0").unwrap();
        writeln!(file, "Ti,0.0,0.0,-5.0,1.0").unwrap();
        file.flush().unwrap();

        let reference = OffsetReference::from_csv(file.path(), "Ti").unwrap();
        assert_eq!(reference.stoichiometry.get("O"), Some(&3.0));
        assert_eq!(reference.bulk_energies.get("Ti"), Some(&-5.0));
    }
}
