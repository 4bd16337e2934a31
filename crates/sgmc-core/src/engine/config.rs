use super::acceptance::AcceptanceMode;
use crate::core::energy::offset::OffsetReference;
use crate::core::models::element;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Canonical ensemble requires num_ads_atoms > 0")]
    CanonicalWithoutAdsorbates,

    #[error("Annealing factor alpha must lie in (0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("Initial temperature must be positive, got {0}")]
    InvalidTemperature(f64),

    #[error("Adsorbate species list must not be empty")]
    NoAdsorbates,

    #[error("Unknown adsorbate element: {0}")]
    UnknownAdsorbate(String),

    #[error("Distance-filter cutoff must be non-negative, got {0}")]
    InvalidFilterCutoff(f64),

    #[error("A force threshold requires an energy threshold to clamp to")]
    ForceThresholdWithoutEnergyThreshold,

    #[error("Offset correction requested but no reference data supplied")]
    MissingOffsetReference,
}

/// The statistical ensemble the chain samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensemble {
    /// Fixed adsorbate count; sweeps use pair exchanges, preceded by a fill
    /// phase that adsorbs exactly `num_ads_atoms` atoms.
    Canonical { num_ads_atoms: usize },
    /// Adsorbate count fluctuates against an implicit chemical-potential
    /// reservoir; sweeps use single-site flips.
    GrandCanonical,
}

/// How a species is chosen for a grand-canonical `Add` move when several
/// adsorbates are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeciesPolicy {
    /// Always the first configured adsorbate (the legacy behavior).
    #[default]
    First,
    /// Uniformly random among the configured adsorbates.
    Uniform,
    /// Cycle deterministically through the configured adsorbates.
    RoundRobin,
}

/// The complete, validated configuration of one annealing run.
///
/// Immutable for the duration of the run. Construct through
/// [`EnsembleConfigBuilder`], which fails fast on every invalid combination
/// instead of letting a misconfigured chain start.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    /// Ensemble kind.
    pub ensemble: Ensemble,
    /// Number of sweeps to run; each sweep is `N_sites` trials.
    pub num_sweeps: usize,
    /// Initial sampling temperature `T0` (in energy units, i.e. `k_B T`).
    pub temperature: f64,
    /// Geometric annealing factor in `(0, 1]`.
    pub alpha: f64,
    /// Chemical potential per adsorbate species (grand canonical only).
    pub chemical_potentials: BTreeMap<String, f64>,
    /// Candidate adsorbate species.
    pub adsorbates: Vec<String>,
    /// Species-selection policy for `Add` moves.
    pub species_policy: SpeciesPolicy,
    /// If set, flips only target sites of this connectivity class.
    pub site_class_restriction: Option<u32>,
    /// Relax structures during energy evaluation.
    pub relax: bool,
    /// Clamp `|E_new|` to this value when it exceeds it.
    pub energy_threshold: Option<f64>,
    /// Treat `E_new` as out of bounds when the maximum force exceeds this.
    pub force_threshold: Option<f64>,
    /// Distance-filter cutoff in Angstroms; `0` disables geometric filtering.
    pub filter_cutoff: f64,
    /// Accept every move unconditionally (state-machine testing mode).
    pub testing: bool,
    /// Fail if the oracle cannot provide per-atom energies.
    pub require_per_atom_energies: bool,
    /// Apply offset correction to reported energies.
    pub offset_correction: bool,
    /// Reference data for offset correction.
    pub offset_reference: Option<OffsetReference>,
    /// Seed of the run's random number stream.
    pub seed: u64,
}

impl EnsembleConfig {
    /// Returns the acceptance mode this configuration selects, in priority
    /// order: testing, then geometric filtering, then the Metropolis test.
    pub fn acceptance_mode(&self) -> AcceptanceMode {
        if self.testing {
            AcceptanceMode::AlwaysAccept
        } else if self.filter_cutoff > 0.0 {
            AcceptanceMode::GeometricFilter {
                cutoff: self.filter_cutoff,
            }
        } else {
            AcceptanceMode::EnergyMetropolis
        }
    }

    /// Re-checks the cross-field validity rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Ensemble::Canonical { num_ads_atoms } = self.ensemble {
            if num_ads_atoms == 0 {
                return Err(ConfigError::CanonicalWithoutAdsorbates);
            }
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if self.temperature <= 0.0 {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if self.adsorbates.is_empty() {
            return Err(ConfigError::NoAdsorbates);
        }
        for species in &self.adsorbates {
            if !element::is_known(species) {
                return Err(ConfigError::UnknownAdsorbate(species.clone()));
            }
        }
        if self.filter_cutoff < 0.0 {
            return Err(ConfigError::InvalidFilterCutoff(self.filter_cutoff));
        }
        // An out-of-bounds force is handled by clamping the energy, so the
        // force threshold is meaningless without an energy threshold.
        if self.force_threshold.is_some() && self.energy_threshold.is_none() {
            return Err(ConfigError::ForceThresholdWithoutEnergyThreshold);
        }
        if self.offset_correction && self.offset_reference.is_none() {
            return Err(ConfigError::MissingOffsetReference);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct EnsembleConfigBuilder {
    ensemble: Option<Ensemble>,
    num_sweeps: Option<usize>,
    temperature: Option<f64>,
    alpha: Option<f64>,
    chemical_potentials: BTreeMap<String, f64>,
    adsorbates: Option<Vec<String>>,
    species_policy: SpeciesPolicy,
    site_class_restriction: Option<u32>,
    relax: bool,
    energy_threshold: Option<f64>,
    force_threshold: Option<f64>,
    filter_cutoff: f64,
    testing: bool,
    require_per_atom_energies: bool,
    offset_correction: bool,
    offset_reference: Option<OffsetReference>,
    seed: u64,
}

impl EnsembleConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensemble(mut self, ensemble: Ensemble) -> Self {
        self.ensemble = Some(ensemble);
        self
    }
    pub fn num_sweeps(mut self, num_sweeps: usize) -> Self {
        self.num_sweeps = Some(num_sweeps);
        self
    }
    pub fn temperature(mut self, t0: f64) -> Self {
        self.temperature = Some(t0);
        self
    }
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }
    pub fn chemical_potential(mut self, species: &str, mu: f64) -> Self {
        self.chemical_potentials.insert(species.to_string(), mu);
        self
    }
    pub fn adsorbates(mut self, adsorbates: Vec<String>) -> Self {
        self.adsorbates = Some(adsorbates);
        self
    }
    pub fn species_policy(mut self, policy: SpeciesPolicy) -> Self {
        self.species_policy = policy;
        self
    }
    pub fn site_class_restriction(mut self, class: u32) -> Self {
        self.site_class_restriction = Some(class);
        self
    }
    pub fn relax(mut self, relax: bool) -> Self {
        self.relax = relax;
        self
    }
    pub fn energy_threshold(mut self, threshold: f64) -> Self {
        self.energy_threshold = Some(threshold);
        self
    }
    pub fn force_threshold(mut self, threshold: f64) -> Self {
        self.force_threshold = Some(threshold);
        self
    }
    pub fn filter_cutoff(mut self, cutoff: f64) -> Self {
        self.filter_cutoff = cutoff;
        self
    }
    pub fn testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }
    pub fn require_per_atom_energies(mut self, required: bool) -> Self {
        self.require_per_atom_energies = required;
        self
    }
    pub fn offset_correction(mut self, reference: OffsetReference) -> Self {
        self.offset_correction = true;
        self.offset_reference = Some(reference);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<EnsembleConfig, ConfigError> {
        let config = EnsembleConfig {
            ensemble: self.ensemble.unwrap_or(Ensemble::GrandCanonical),
            num_sweeps: self
                .num_sweeps
                .ok_or(ConfigError::MissingParameter("num_sweeps"))?,
            temperature: self
                .temperature
                .ok_or(ConfigError::MissingParameter("temperature"))?,
            alpha: self.alpha.unwrap_or(1.0),
            chemical_potentials: self.chemical_potentials,
            adsorbates: self
                .adsorbates
                .ok_or(ConfigError::MissingParameter("adsorbates"))?,
            species_policy: self.species_policy,
            site_class_restriction: self.site_class_restriction,
            relax: self.relax,
            energy_threshold: self.energy_threshold,
            force_threshold: self.force_threshold,
            filter_cutoff: self.filter_cutoff,
            testing: self.testing,
            require_per_atom_energies: self.require_per_atom_energies,
            offset_correction: self.offset_correction,
            offset_reference: self.offset_reference,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> EnsembleConfigBuilder {
        EnsembleConfigBuilder::new()
            .num_sweeps(10)
            .temperature(1.0)
            .adsorbates(vec!["Cu".to_string()])
    }

    #[test]
    fn minimal_grand_canonical_config_builds() {
        let config = builder().build().unwrap();
        assert_eq!(config.ensemble, Ensemble::GrandCanonical);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.acceptance_mode(), AcceptanceMode::EnergyMetropolis);
    }

    #[test]
    fn canonical_without_adsorbate_count_is_rejected() {
        let err = builder()
            .ensemble(Ensemble::Canonical { num_ads_atoms: 0 })
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::CanonicalWithoutAdsorbates);
    }

    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        assert_eq!(
            builder().alpha(0.0).build().unwrap_err(),
            ConfigError::InvalidAlpha(0.0)
        );
        assert_eq!(
            builder().alpha(1.5).build().unwrap_err(),
            ConfigError::InvalidAlpha(1.5)
        );
        assert!(builder().alpha(1.0).build().is_ok());
    }

    #[test]
    fn unknown_adsorbate_is_rejected() {
        let err = builder()
            .adsorbates(vec!["Qq".to_string()])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownAdsorbate("Qq".to_string()));
    }

    #[test]
    fn missing_required_parameters_are_reported() {
        let err = EnsembleConfigBuilder::new()
            .temperature(1.0)
            .adsorbates(vec!["Cu".to_string()])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("num_sweeps"));
    }

    #[test]
    fn force_threshold_without_energy_threshold_is_rejected() {
        let err = builder().force_threshold(50.0).build().unwrap_err();
        assert_eq!(err, ConfigError::ForceThresholdWithoutEnergyThreshold);
        assert!(builder()
            .force_threshold(50.0)
            .energy_threshold(1000.0)
            .build()
            .is_ok());
    }

    #[test]
    fn testing_takes_priority_over_filter_and_metropolis() {
        let config = builder().testing(true).filter_cutoff(2.0).build().unwrap();
        assert_eq!(config.acceptance_mode(), AcceptanceMode::AlwaysAccept);
    }

    #[test]
    fn positive_cutoff_selects_geometric_filtering() {
        let config = builder().filter_cutoff(2.0).build().unwrap();
        assert_eq!(
            config.acceptance_mode(),
            AcceptanceMode::GeometricFilter { cutoff: 2.0 }
        );
    }
}
