use crate::error::{CliError, Result};
use serde::Deserialize;
use sgmc::core::energy::offset::OffsetReference;
use sgmc::core::energy::pair::{LennardJones, LjParams};
use sgmc::core::models::lattice::{GeometryProvider, SquareLattice};
use sgmc::core::models::site::SiteLattice;
use sgmc::core::models::slab::Slab;
use sgmc::engine::config as core_config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The on-disk run configuration, one TOML file per run.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunFile {
    pub lattice: LatticeSection,
    pub ensemble: EnsembleSection,
    pub energy: EnergySection,
    #[serde(default)]
    pub offset: Option<OffsetSection>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LatticeSection {
    pub element: String,
    pub lattice_constant: f64,
    /// In-plane repetitions and layer count: `[nx, ny, layers]`.
    pub size: [usize; 3],
    #[serde(default = "default_vacuum")]
    pub vacuum: f64,
    #[serde(default = "default_site_height")]
    pub site_height: f64,
}

fn default_vacuum() -> f64 {
    15.0
}

fn default_site_height() -> f64 {
    2.0
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EnsembleKind {
    Canonical,
    GrandCanonical,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SpeciesPolicyKind {
    First,
    Uniform,
    RoundRobin,
}

impl From<SpeciesPolicyKind> for core_config::SpeciesPolicy {
    fn from(kind: SpeciesPolicyKind) -> Self {
        match kind {
            SpeciesPolicyKind::First => Self::First,
            SpeciesPolicyKind::Uniform => Self::Uniform,
            SpeciesPolicyKind::RoundRobin => Self::RoundRobin,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnsembleSection {
    pub kind: EnsembleKind,
    /// Required when `kind = "canonical"`.
    #[serde(default)]
    pub num_ads_atoms: Option<usize>,
    pub num_sweeps: usize,
    pub temperature: f64,
    #[serde(default)]
    pub alpha: Option<f64>,
    pub adsorbates: Vec<String>,
    #[serde(default)]
    pub species_policy: Option<SpeciesPolicyKind>,
    /// Restrict flips to one connectivity class (1 = top, 2 = bridge, 4 = hollow).
    #[serde(default)]
    pub site_class: Option<u32>,
    #[serde(default)]
    pub chemical_potentials: BTreeMap<String, f64>,
    #[serde(default)]
    pub filter_cutoff: Option<f64>,
    #[serde(default)]
    pub testing: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnergySection {
    /// Pair interaction cutoff in Angstroms.
    pub cutoff: f64,
    #[serde(default)]
    pub relax: bool,
    /// Maximum relaxation steps per evaluation.
    #[serde(default)]
    pub relax_steps: Option<usize>,
    /// Steepest-descent step size in Angstroms.
    #[serde(default)]
    pub relax_step_size: Option<f64>,
    /// Force norm below which relaxation stops early.
    #[serde(default)]
    pub relax_force_tolerance: Option<f64>,
    #[serde(default)]
    pub energy_threshold: Option<f64>,
    #[serde(default)]
    pub force_threshold: Option<f64>,
    /// Fail the run if the oracle cannot report per-atom energies.
    #[serde(default)]
    pub require_per_atom_energies: bool,
    /// Lennard-Jones parameters keyed by element symbol.
    pub pair: BTreeMap<String, PairSection>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PairSection {
    pub epsilon: f64,
    pub sigma: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OffsetSection {
    /// CSV table with columns `element,slope,intercept,bulk_energy,ratio`.
    pub reference_csv: PathBuf,
    pub reference_element: String,
}

impl RunFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file: RunFile = toml::from_str(&text).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded run configuration");
        Ok(file)
    }

    /// Translates the file into a validated engine configuration.
    pub fn to_engine_config(&self) -> Result<core_config::EnsembleConfig> {
        let ensemble = match self.ensemble.kind {
            EnsembleKind::GrandCanonical => core_config::Ensemble::GrandCanonical,
            EnsembleKind::Canonical => {
                let num_ads_atoms = self.ensemble.num_ads_atoms.ok_or_else(|| {
                    CliError::Config(
                        "canonical ensemble requires `num-ads-atoms`".to_string(),
                    )
                })?;
                core_config::Ensemble::Canonical { num_ads_atoms }
            }
        };

        let mut builder = core_config::EnsembleConfigBuilder::new()
            .ensemble(ensemble)
            .num_sweeps(self.ensemble.num_sweeps)
            .temperature(self.ensemble.temperature)
            .adsorbates(self.ensemble.adsorbates.clone())
            .relax(self.energy.relax)
            .require_per_atom_energies(self.energy.require_per_atom_energies)
            .testing(self.ensemble.testing);

        if let Some(alpha) = self.ensemble.alpha {
            builder = builder.alpha(alpha);
        }
        if let Some(policy) = self.ensemble.species_policy {
            builder = builder.species_policy(policy.into());
        }
        if let Some(class) = self.ensemble.site_class {
            builder = builder.site_class_restriction(class);
        }
        for (species, mu) in &self.ensemble.chemical_potentials {
            builder = builder.chemical_potential(species, *mu);
        }
        if let Some(cutoff) = self.ensemble.filter_cutoff {
            builder = builder.filter_cutoff(cutoff);
        }
        if let Some(threshold) = self.energy.energy_threshold {
            builder = builder.energy_threshold(threshold);
        }
        if let Some(threshold) = self.energy.force_threshold {
            builder = builder.force_threshold(threshold);
        }
        if let Some(seed) = self.ensemble.seed {
            builder = builder.seed(seed);
        }
        if let Some(offset) = &self.offset {
            let reference =
                OffsetReference::from_csv(&offset.reference_csv, &offset.reference_element)?;
            builder = builder.offset_correction(reference);
        }

        builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Builds the pristine slab and its adsorption sites.
    pub fn build_geometry(&self) -> Result<(Slab, SiteLattice)> {
        let provider = SquareLattice {
            element: self.lattice.element.clone(),
            lattice_constant: self.lattice.lattice_constant,
            size: (
                self.lattice.size[0],
                self.lattice.size[1],
                self.lattice.size[2],
            ),
            vacuum: self.lattice.vacuum,
            site_height: self.lattice.site_height,
        };
        Ok(provider.build()?)
    }

    /// Builds the pair-potential oracle, freezing the pristine substrate.
    pub fn build_oracle(&self, frozen: usize) -> LennardJones {
        let params = self
            .energy
            .pair
            .iter()
            .map(|(species, p)| {
                (
                    species.clone(),
                    LjParams {
                        epsilon: p.epsilon,
                        sigma: p.sigma,
                    },
                )
            })
            .collect();
        let mut oracle = LennardJones::new(params, self.energy.cutoff, frozen);
        if self.energy.relax_steps.is_some()
            || self.energy.relax_step_size.is_some()
            || self.energy.relax_force_tolerance.is_some()
        {
            oracle = oracle.with_relaxation(
                self.energy.relax_steps.unwrap_or(20),
                self.energy.relax_step_size.unwrap_or(0.05),
                self.energy.relax_force_tolerance.unwrap_or(0.2),
            );
        }
        oracle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [lattice]
        element = "Cu"
        lattice-constant = 3.6147
        size = [3, 3, 2]

        [ensemble]
        kind = "grand-canonical"
        num-sweeps = 10
        temperature = 1.0
        alpha = 0.99
        adsorbates = ["O"]
        seed = 7

        [ensemble.chemical-potentials]
        O = -1.5

        [energy]
        cutoff = 8.0

        [energy.pair.Cu]
        epsilon = 0.2
        sigma = 2.3

        [energy.pair.O]
        epsilon = 0.1
        sigma = 2.7
    "#;

    #[test]
    fn minimal_file_produces_a_valid_engine_config() {
        let file: RunFile = toml::from_str(MINIMAL).unwrap();
        let config = file.to_engine_config().unwrap();
        assert_eq!(config.ensemble, core_config::Ensemble::GrandCanonical);
        assert_eq!(config.num_sweeps, 10);
        assert_eq!(config.alpha, 0.99);
        assert_eq!(config.chemical_potentials.get("O"), Some(&-1.5));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn geometry_and_oracle_build_from_the_file() {
        let file: RunFile = toml::from_str(MINIMAL).unwrap();
        let (slab, sites) = file.build_geometry().unwrap();
        assert_eq!(slab.len(), 3 * 3 * 2);
        assert_eq!(sites.len(), 2 * 3 * 3);
        let _oracle = file.build_oracle(slab.len());
    }

    #[test]
    fn canonical_kind_requires_an_atom_count() {
        let text = MINIMAL.replace("grand-canonical", "canonical");
        let file: RunFile = toml::from_str(&text).unwrap();
        let err = file.to_engine_config().unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\n[surprise]\nvalue = 1\n");
        assert!(toml::from_str::<RunFile>(&text).is_err());
    }

    #[test]
    fn defaults_fill_in_optional_lattice_fields() {
        let file: RunFile = toml::from_str(MINIMAL).unwrap();
        assert_eq!(file.lattice.vacuum, 15.0);
        assert_eq!(file.lattice.site_height, 2.0);
    }
}
