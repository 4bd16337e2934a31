use super::config::EnsembleConfig;
use super::error::EngineError;
use super::filter::{DistanceFilter, MinDistanceFilter};
use super::proposal::Move;
use crate::core::energy::{EnergyOracle, Evaluation};
use crate::core::models::slab::Slab;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The three mutually exclusive acceptance code paths, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcceptanceMode {
    /// Metropolis test against the energy oracle.
    EnergyMetropolis,
    /// Deterministic pass/fail by interatomic distance; no energy evaluation.
    GeometricFilter { cutoff: f64 },
    /// Commit every proposal; validates state-machine mechanics in isolation.
    AlwaysAccept,
}

/// Energy placeholder reported by the non-energetic acceptance modes.
const SENTINEL_ENERGY: f64 = 0.0;

/// Returns the Metropolis acceptance probability `min(1, exp(-weight / T))`.
///
/// Downhill moves (`weight <= 0`) are always accepted. At `T -> 0+` the
/// probability of an uphill move vanishes; at `T -> inf` it approaches 1.
pub fn metropolis_probability(weight: f64, temperature: f64) -> f64 {
    if weight <= 0.0 {
        1.0
    } else if temperature <= 0.0 {
        0.0
    } else {
        (-weight / temperature).exp().min(1.0)
    }
}

/// The verdict on one tentative move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Whether the applied mutation becomes the new baseline state.
    pub accepted: bool,
    /// The chain energy after this trial: `E_new` on accept, the unchanged
    /// baseline on reject, or the sentinel `0` in non-energetic modes.
    pub energy: f64,
}

/// Evaluates applied tentative moves and issues accept/reject verdicts.
///
/// The engine carries the chain's energy baseline (`E_prev`, the energy of
/// the last committed configuration). Callers must seed it before the first
/// Metropolis trial, evaluate moves through [`AcceptanceEngine::decide`], and
/// roll back rejected mutations themselves; this component never touches the
/// slab.
pub struct AcceptanceEngine {
    mode: AcceptanceMode,
    relax: bool,
    energy_threshold: Option<f64>,
    force_threshold: Option<f64>,
    require_per_atom_energies: bool,
    restricted: Vec<String>,
    filter: Box<dyn DistanceFilter>,
    baseline_energy: Option<f64>,
}

impl AcceptanceEngine {
    /// Creates an engine from the run configuration, with the default
    /// pairwise distance filter.
    pub fn from_config(config: &EnsembleConfig) -> Self {
        Self {
            mode: config.acceptance_mode(),
            relax: config.relax,
            energy_threshold: config.energy_threshold,
            force_threshold: config.force_threshold,
            require_per_atom_energies: config.require_per_atom_energies,
            restricted: config.adsorbates.clone(),
            filter: Box::new(MinDistanceFilter),
            baseline_energy: None,
        }
    }

    /// Replaces the distance-filter collaborator.
    pub fn with_filter(mut self, filter: Box<dyn DistanceFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Returns the current energy baseline, if one has been established.
    pub fn baseline_energy(&self) -> Option<f64> {
        self.baseline_energy
    }

    /// Seeds or re-seeds the energy baseline (run start, sweep-end relaxation).
    pub fn set_baseline_energy(&mut self, energy: f64) {
        self.baseline_energy = Some(energy);
    }

    /// Decides the fate of a move already applied to `slab`.
    ///
    /// On accept the tentative mutation is the new baseline and `E_prev` is
    /// updated; on reject the caller must apply the move's inverse.
    pub fn decide(
        &mut self,
        slab: &Slab,
        mv: &Move,
        temperature: f64,
        chemical_potentials: &BTreeMap<String, f64>,
        oracle: &mut dyn EnergyOracle,
        rng: &mut impl Rng,
    ) -> Result<Decision, EngineError> {
        match self.mode {
            AcceptanceMode::AlwaysAccept => {
                self.baseline_energy = Some(SENTINEL_ENERGY);
                Ok(Decision {
                    accepted: true,
                    energy: SENTINEL_ENERGY,
                })
            }
            AcceptanceMode::GeometricFilter { cutoff } => {
                let accepted = self.filter.is_valid(slab, &self.restricted, cutoff);
                self.baseline_energy = Some(SENTINEL_ENERGY);
                Ok(Decision {
                    accepted,
                    energy: SENTINEL_ENERGY,
                })
            }
            AcceptanceMode::EnergyMetropolis => {
                self.decide_metropolis(slab, mv, temperature, chemical_potentials, oracle, rng)
            }
        }
    }

    fn decide_metropolis(
        &mut self,
        slab: &Slab,
        mv: &Move,
        temperature: f64,
        chemical_potentials: &BTreeMap<String, f64>,
        oracle: &mut dyn EnergyOracle,
        rng: &mut impl Rng,
    ) -> Result<Decision, EngineError> {
        let e_prev = self.baseline_energy.ok_or_else(|| {
            EngineError::Internal("energy baseline not seeded before Metropolis trial".to_string())
        })?;

        let evaluation = oracle.evaluate(slab, self.relax)?;
        if self.require_per_atom_energies && evaluation.per_atom_energies.is_none() {
            return Err(EngineError::MissingPerAtomEnergies);
        }
        let e_new = self.bounded_energy(&evaluation);

        let mut weight = e_new - e_prev;
        for (species, delta_n) in mv.species_deltas() {
            let mu = chemical_potentials.get(species).copied().unwrap_or(0.0);
            weight -= f64::from(delta_n) * mu;
        }

        let probability = metropolis_probability(weight, temperature);
        let accepted = rng.r#gen::<f64>() < probability;
        debug!(
            e_prev,
            e_new, weight, temperature, probability, accepted, "metropolis trial"
        );

        if accepted {
            self.baseline_energy = Some(e_new);
            Ok(Decision {
                accepted: true,
                energy: e_new,
            })
        } else {
            Ok(Decision {
                accepted: false,
                energy: e_prev,
            })
        }
    }

    /// Clamps `E_new` to the configured energy threshold when the energy or
    /// the maximum force is out of bounds, biasing the trial toward rejection
    /// without propagating an unphysical value into the chain.
    fn bounded_energy(&self, evaluation: &Evaluation) -> f64 {
        let mut energy = evaluation.energy;
        if let Some(threshold) = self.energy_threshold {
            if energy.abs() > threshold {
                warn!(energy, threshold, "energy exceeds threshold, clamping");
                energy = threshold;
            }
        }
        if let (Some(threshold), Some(max_force)) = (self.force_threshold, evaluation.max_force) {
            if max_force > threshold {
                if let Some(clamp) = self.energy_threshold {
                    warn!(max_force, threshold, "force exceeds threshold, clamping energy");
                    energy = clamp;
                }
            }
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::energy::EnergyError;
    use crate::core::models::atom::Atom;
    use crate::core::models::slab::Cell;
    use crate::engine::config::{Ensemble, EnsembleConfigBuilder};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct ConstOracle(f64);

    impl EnergyOracle for ConstOracle {
        fn evaluate(&mut self, _slab: &Slab, _relax: bool) -> Result<Evaluation, EnergyError> {
            Ok(Evaluation::from_energy(self.0))
        }
    }

    struct ForcedOracle {
        energy: f64,
        max_force: f64,
    }

    impl EnergyOracle for ForcedOracle {
        fn evaluate(&mut self, _slab: &Slab, _relax: bool) -> Result<Evaluation, EnergyError> {
            let mut evaluation = Evaluation::from_energy(self.energy);
            evaluation.max_force = Some(self.max_force);
            Ok(evaluation)
        }
    }

    fn slab() -> Slab {
        let atoms = vec![Atom::new("Cu", Point3::origin())];
        Slab::new(atoms, Cell::slab(Vector3::new(10.0, 10.0, 30.0)))
    }

    fn config() -> EnsembleConfigBuilder {
        EnsembleConfigBuilder::new()
            .ensemble(Ensemble::GrandCanonical)
            .num_sweeps(1)
            .temperature(1.0)
            .adsorbates(vec!["Cu".to_string()])
    }

    fn add_move() -> Move {
        Move::Add {
            site: 0,
            species: "Cu".to_string(),
        }
    }

    #[test]
    fn probability_is_monotonic_in_temperature() {
        let weight = 1.0;
        let mut prev = 0.0;
        for temperature in [0.01, 0.1, 1.0, 10.0, 1e6] {
            let p = metropolis_probability(weight, temperature);
            assert!(p > prev);
            prev = p;
        }
        assert_relative_eq!(prev, 1.0, epsilon = 1e-6);
        assert_relative_eq!(
            metropolis_probability(weight, 1e-12),
            0.0,
            epsilon = 1e-300
        );
    }

    #[test]
    fn downhill_moves_are_certain() {
        assert_eq!(metropolis_probability(-5.0, 0.5), 1.0);
        assert_eq!(metropolis_probability(0.0, 0.5), 1.0);
    }

    #[test]
    fn always_accept_reports_sentinel_energy() {
        let config = config().testing(true).build().unwrap();
        let mut engine = AcceptanceEngine::from_config(&config);
        let mut rng = StdRng::seed_from_u64(0);
        let mut oracle = ConstOracle(123.0);
        for _ in 0..16 {
            let decision = engine
                .decide(
                    &slab(),
                    &add_move(),
                    1.0,
                    &BTreeMap::new(),
                    &mut oracle,
                    &mut rng,
                )
                .unwrap();
            assert!(decision.accepted);
            assert_eq!(decision.energy, 0.0);
        }
    }

    #[test]
    fn metropolis_without_baseline_is_an_internal_error() {
        let config = config().build().unwrap();
        let mut engine = AcceptanceEngine::from_config(&config);
        let mut rng = StdRng::seed_from_u64(0);
        let err = engine
            .decide(
                &slab(),
                &add_move(),
                1.0,
                &BTreeMap::new(),
                &mut ConstOracle(0.0),
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn energy_above_threshold_is_clamped_to_threshold() {
        // With the threshold at zero, an oracle energy of 5.0 must enter the
        // weight as 0.0 and be reported as such on accept.
        let config = config().energy_threshold(0.0).build().unwrap();
        let mut engine = AcceptanceEngine::from_config(&config);
        engine.set_baseline_energy(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let decision = engine
            .decide(
                &slab(),
                &add_move(),
                1.0,
                &BTreeMap::new(),
                &mut ConstOracle(5.0),
                &mut rng,
            )
            .unwrap();
        assert!(decision.accepted);
        assert_eq!(decision.energy, 0.0);
    }

    #[test]
    fn force_above_threshold_clamps_the_energy() {
        // The energy itself is in bounds; the out-of-bounds force alone must
        // trigger the clamp so the raw value never becomes the baseline.
        let config = config()
            .energy_threshold(1.0)
            .force_threshold(0.0)
            .build()
            .unwrap();
        let mut engine = AcceptanceEngine::from_config(&config);
        engine.set_baseline_energy(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut oracle = ForcedOracle {
            energy: 0.5,
            max_force: 500.0,
        };
        let decision = engine
            .decide(
                &slab(),
                &add_move(),
                1e9,
                &BTreeMap::new(),
                &mut oracle,
                &mut rng,
            )
            .unwrap();
        assert!(decision.accepted);
        assert_eq!(decision.energy, 1.0);
        assert_eq!(engine.baseline_energy(), Some(1.0));
    }

    #[test]
    fn chemical_potential_biases_additions() {
        let config = config().build().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut oracle = ConstOracle(0.0);

        // Strongly favorable reservoir: weight = -mu, certain accept.
        let mut favorable = BTreeMap::new();
        favorable.insert("Cu".to_string(), 1000.0);
        let mut engine = AcceptanceEngine::from_config(&config);
        engine.set_baseline_energy(0.0);
        let decision = engine
            .decide(&slab(), &add_move(), 1.0, &favorable, &mut oracle, &mut rng)
            .unwrap();
        assert!(decision.accepted);

        // Strongly unfavorable reservoir: weight = +mu, certain reject.
        let mut unfavorable = BTreeMap::new();
        unfavorable.insert("Cu".to_string(), -1000.0);
        let mut engine = AcceptanceEngine::from_config(&config);
        engine.set_baseline_energy(0.0);
        let decision = engine
            .decide(
                &slab(),
                &add_move(),
                1.0,
                &unfavorable,
                &mut oracle,
                &mut rng,
            )
            .unwrap();
        assert!(!decision.accepted);
        assert_eq!(decision.energy, 0.0);
    }

    #[test]
    fn exchange_moves_ignore_the_reservoir() {
        let config = config().build().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pots = BTreeMap::new();
        pots.insert("Cu".to_string(), -1000.0);

        let mut engine = AcceptanceEngine::from_config(&config);
        engine.set_baseline_energy(0.0);
        let exchange = Move::Exchange {
            from: 0,
            to: 1,
            species: "Cu".to_string(),
        };
        // Zero energy difference and no delta-n term: certain accept.
        let decision = engine
            .decide(&slab(), &exchange, 1.0, &pots, &mut ConstOracle(0.0), &mut rng)
            .unwrap();
        assert!(decision.accepted);
    }

    #[test]
    fn missing_per_atom_energies_fail_when_required() {
        let config = config().require_per_atom_energies(true).build().unwrap();
        let mut engine = AcceptanceEngine::from_config(&config);
        engine.set_baseline_energy(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let err = engine
            .decide(
                &slab(),
                &add_move(),
                1.0,
                &BTreeMap::new(),
                &mut ConstOracle(0.0),
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingPerAtomEnergies));
    }
}
