use super::acceptance::{AcceptanceEngine, AcceptanceMode};
use super::config::{Ensemble, EnsembleConfig};
use super::error::EngineError;
use super::mutator::SlabMutator;
use super::progress::{Progress, ProgressReporter};
use super::proposal::{Move, MoveProposer};
use super::schedule::AnnealScheduler;
use super::state::SiteState;
use crate::core::energy::offset::OffsetCorrector;
use crate::core::energy::EnergyOracle;
use crate::core::models::site::SiteLattice;
use crate::core::models::slab::Slab;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Upper bound on fill-phase proposals, per requested adsorbate.
const MAX_FILL_ATTEMPTS_PER_ATOM: usize = 1000;

/// Everything recorded at the end of one sweep.
#[derive(Debug, Clone)]
pub struct SweepResult {
    /// 0-based sweep index.
    pub index: usize,
    /// Sampling temperature of the sweep.
    pub temperature: f64,
    /// Reported chain energy, offset-corrected when configured.
    pub energy: f64,
    /// Fraction of trials accepted within the sweep.
    pub acceptance: f64,
    /// Occupied-site counts bucketed by connectivity class.
    pub coverage: BTreeMap<u32, usize>,
    /// The as-sampled configuration at sweep end.
    pub snapshot: Slab,
    /// The relaxed configuration, when sweep-end relaxation ran.
    pub relaxed_snapshot: Option<Slab>,
}

/// The accumulated outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Per-sweep records, in sweep order.
    pub sweeps: Vec<SweepResult>,
    /// Where artifacts were persisted, if the caller requested persistence.
    pub output_dir: Option<PathBuf>,
}

impl RunResult {
    /// Returns the reported energy of each sweep, in sweep order.
    pub fn energy_history(&self) -> Vec<f64> {
        self.sweeps.iter().map(|s| s.energy).collect()
    }

    /// Returns the acceptance fraction of each sweep, in sweep order.
    pub fn acceptance_history(&self) -> Vec<f64> {
        self.sweeps.iter().map(|s| s.acceptance).collect()
    }

    /// Returns the per-class occupancy trajectory: one series per
    /// connectivity class, each of length `num_sweeps`.
    pub fn coverage_history(&self) -> BTreeMap<u32, Vec<usize>> {
        let mut history: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for sweep in &self.sweeps {
            for (class, count) in &sweep.coverage {
                history
                    .entry(*class)
                    .or_insert_with(|| Vec::with_capacity(self.sweeps.len()))
                    .push(*count);
            }
        }
        history
    }

    /// Returns the final configuration, if at least one sweep ran.
    pub fn final_snapshot(&self) -> Option<&Slab> {
        self.sweeps.last().map(|s| &s.snapshot)
    }
}

/// The annealing chain: owns the evolving slab and runs it sweep by sweep.
///
/// One trial is propose, apply, decide, then commit or roll back; one sweep
/// is `N_sites` trials at a fixed temperature followed by bookkeeping. The
/// driver never leaves the slab and the occupancy state out of sync: every
/// trial ends with the invariants re-checked, and a violation aborts the run
/// rather than silently sampling from a corrupted chain.
pub struct SweepDriver<'a> {
    slab: Slab,
    sites: SiteLattice,
    config: EnsembleConfig,
    oracle: &'a mut dyn EnergyOracle,
    state: SiteState,
    proposer: MoveProposer,
    acceptance: AcceptanceEngine,
    scheduler: AnnealScheduler,
    corrector: Option<OffsetCorrector>,
    rng: StdRng,
}

impl std::fmt::Debug for SweepDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepDriver").finish_non_exhaustive()
    }
}

impl<'a> SweepDriver<'a> {
    /// Creates a driver over a pristine slab and its enumerated sites.
    ///
    /// For the Metropolis acceptance mode this performs one static evaluation
    /// of the pristine slab to seed the chain's energy baseline.
    pub fn new(
        slab: Slab,
        sites: SiteLattice,
        config: EnsembleConfig,
        oracle: &'a mut dyn EnergyOracle,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if sites.is_empty() {
            return Err(EngineError::NoEligibleSite(
                "the site lattice has no sites".to_string(),
            ));
        }

        let corrector = match (&config.offset_reference, config.offset_correction) {
            (Some(reference), true) => Some(OffsetCorrector::new(reference.clone())?),
            _ => None,
        };

        let state = SiteState::new(sites.len(), slab.len());
        let proposer = MoveProposer::new(
            config.adsorbates.clone(),
            config.species_policy,
            config.site_class_restriction,
        );
        let mut acceptance = AcceptanceEngine::from_config(&config);
        if config.acceptance_mode() == AcceptanceMode::EnergyMetropolis {
            let baseline = oracle.evaluate(&slab, false)?;
            acceptance.set_baseline_energy(baseline.energy);
            debug!(energy = baseline.energy, "seeded chain baseline");
        }
        let scheduler = AnnealScheduler::new(config.temperature, config.alpha);
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            slab,
            sites,
            config,
            oracle,
            state,
            proposer,
            acceptance,
            scheduler,
            corrector,
            rng,
        })
    }

    /// Returns the current configuration of the chain.
    pub fn slab(&self) -> &Slab {
        &self.slab
    }

    /// Returns the current occupancy state.
    pub fn state(&self) -> &SiteState {
        &self.state
    }

    /// Runs the whole schedule: the canonical fill phase (if applicable)
    /// followed by every configured sweep.
    #[instrument(skip_all, fields(num_sweeps = self.config.num_sweeps))]
    pub fn run(&mut self, reporter: &ProgressReporter) -> Result<RunResult, EngineError> {
        info!(
            num_sweeps = self.config.num_sweeps,
            num_sites = self.sites.len(),
            t0 = self.config.temperature,
            alpha = self.config.alpha,
            "starting annealing run"
        );

        self.fill(reporter)?;

        reporter.report(Progress::RunStart {
            num_sweeps: self.config.num_sweeps,
            num_sites: self.sites.len(),
        });

        let mut sweeps = Vec::with_capacity(self.config.num_sweeps);
        for index in 0..self.config.num_sweeps {
            sweeps.push(self.run_sweep(index, reporter)?);
        }

        reporter.report(Progress::RunFinish);
        info!("annealing run finished");
        Ok(RunResult {
            sweeps,
            output_dir: None,
        })
    }

    /// Adsorbs atoms one by one until the canonical target count is reached.
    ///
    /// Runs before the first sweep, at the initial temperature and with an
    /// empty reservoir, so additions are judged purely on energy or geometry.
    /// A no-op in the grand-canonical ensemble.
    #[instrument(skip_all)]
    pub fn fill(&mut self, reporter: &ProgressReporter) -> Result<(), EngineError> {
        let Ensemble::Canonical { num_ads_atoms } = self.config.ensemble else {
            return Ok(());
        };
        reporter.report(Progress::FillStart {
            target_atoms: num_ads_atoms,
        });

        let temperature = self.scheduler.temperature(0);
        let max_attempts = MAX_FILL_ATTEMPTS_PER_ATOM * num_ads_atoms;
        let mut attempts = 0;
        while self.state.num_adsorbed() < num_ads_atoms {
            if attempts >= max_attempts {
                return Err(EngineError::FillDidNotConverge { attempts });
            }
            attempts += 1;

            let mv =
                self.proposer
                    .propose_flip(&self.slab, &self.state, &self.sites, &mut self.rng)?;
            // Only additions grow the adsorbate count toward the target.
            let Move::Add { .. } = mv else {
                continue;
            };
            self.try_move(&mv, temperature, false)?;
        }

        debug!(attempts, num_ads_atoms, "fill phase converged");
        reporter.report(Progress::FillFinish { attempts });
        Ok(())
    }

    /// Runs `N_sites` trials at the sweep's temperature and records the
    /// sweep-end observables.
    pub fn run_sweep(
        &mut self,
        index: usize,
        reporter: &ProgressReporter,
    ) -> Result<SweepResult, EngineError> {
        let temperature = self.scheduler.temperature(index);
        reporter.report(Progress::SweepStart { index, temperature });

        let trials = self.sites.len();
        let mut accepted = 0;
        for _ in 0..trials {
            if self.run_trial(temperature)? {
                accepted += 1;
            }
        }
        let acceptance = accepted as f64 / trials as f64;

        let mut raw_energy = self.acceptance.baseline_energy().unwrap_or(0.0);
        let mut relaxed_snapshot = None;
        if self.config.relax
            && self.config.acceptance_mode() == AcceptanceMode::EnergyMetropolis
        {
            // Sweep-end relaxation re-anchors the chain on the relaxed energy.
            let evaluation = self.oracle.evaluate(&self.slab, true)?;
            raw_energy = evaluation.energy;
            relaxed_snapshot = evaluation.relaxed;
            self.acceptance.set_baseline_energy(raw_energy);
        }

        let energy = match &self.corrector {
            Some(corrector) => corrector.correct(
                raw_energy,
                &self.slab.composition(),
                &self.config.chemical_potentials,
            ),
            None => raw_energy,
        };
        let coverage = self.state.coverage(&self.sites);

        debug!(index, temperature, energy, acceptance, "sweep finished");
        reporter.report(Progress::SweepFinish {
            index,
            energy,
            acceptance,
        });
        Ok(SweepResult {
            index,
            temperature,
            energy,
            acceptance,
            coverage,
            snapshot: self.slab.clone(),
            relaxed_snapshot,
        })
    }

    /// One trial: propose, apply tentatively, decide, commit or roll back.
    fn run_trial(&mut self, temperature: f64) -> Result<bool, EngineError> {
        let mv = match self.config.ensemble {
            Ensemble::GrandCanonical => {
                self.proposer
                    .propose_flip(&self.slab, &self.state, &self.sites, &mut self.rng)?
            }
            Ensemble::Canonical { .. } => {
                self.proposer
                    .propose_exchange(&self.slab, &self.state, &mut self.rng)?
            }
        };
        self.try_move(&mv, temperature, true)
    }

    /// Applies `mv`, submits it to the acceptance engine, and rolls it back
    /// on rejection. The occupancy invariants are re-checked either way.
    ///
    /// The fill phase passes `use_reservoir = false` so additions are judged
    /// without a chemical-potential term.
    fn try_move(
        &mut self,
        mv: &Move,
        temperature: f64,
        use_reservoir: bool,
    ) -> Result<bool, EngineError> {
        SlabMutator::new(&mut self.slab, &mut self.state, &self.sites).apply(mv)?;

        let empty = BTreeMap::new();
        let chemical_potentials = if use_reservoir {
            &self.config.chemical_potentials
        } else {
            &empty
        };
        let decision = self.acceptance.decide(
            &self.slab,
            mv,
            temperature,
            chemical_potentials,
            self.oracle,
            &mut self.rng,
        )?;
        if !decision.accepted {
            SlabMutator::new(&mut self.slab, &mut self.state, &self.sites).rollback(mv)?;
        }

        self.state.check_invariants(&self.slab)?;
        Ok(decision.accepted)
    }
}
