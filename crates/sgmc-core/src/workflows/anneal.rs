use crate::core::energy::EnergyOracle;
use crate::core::io::{history, xyz, IoError};
use crate::core::models::site::SiteLattice;
use crate::core::models::slab::Slab;
use crate::engine::config::EnsembleConfig;
use crate::engine::driver::{RunResult, SweepDriver};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, instrument};

/// Runs one complete annealing chain and optionally persists its artifacts.
///
/// This is the orchestration layer over [`SweepDriver`]: it validates and
/// wires the components, runs the fill phase and every sweep, and, when
/// `output_dir` is given, writes the run history as `history.csv` plus one
/// XYZ snapshot per sweep into that directory (created if absent).
///
/// # Errors
///
/// Propagates configuration, engine, energy, and persistence failures as
/// [`EngineError`].
#[instrument(skip_all, fields(num_sweeps = config.num_sweeps))]
pub fn run(
    slab: Slab,
    sites: SiteLattice,
    config: EnsembleConfig,
    oracle: &mut dyn EnergyOracle,
    reporter: &ProgressReporter,
    output_dir: Option<&Path>,
) -> Result<RunResult, EngineError> {
    let mut driver = SweepDriver::new(slab, sites, config, oracle)?;
    let mut result = driver.run(reporter)?;

    if let Some(dir) = output_dir {
        persist(&result, dir)?;
        result.output_dir = Some(dir.to_path_buf());
        info!(dir = %dir.display(), "run artifacts written");
    }
    Ok(result)
}

/// Writes `history.csv` and the per-sweep snapshots into `dir`.
fn persist(result: &RunResult, dir: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dir).map_err(IoError::from)?;

    let file = File::create(dir.join("history.csv")).map_err(IoError::from)?;
    history::write_history(
        BufWriter::new(file),
        &result.energy_history(),
        &result.acceptance_history(),
        &result.coverage_history(),
    )?;

    for sweep in &result.sweeps {
        let path = dir.join(format!("sweep_{:05}.xyz", sweep.index));
        let mut writer = BufWriter::new(File::create(path).map_err(IoError::from)?);
        xyz::write_xyz(&mut writer, &sweep.snapshot)?;

        if let Some(relaxed) = &sweep.relaxed_snapshot {
            let path = dir.join(format!("sweep_{:05}_relaxed.xyz", sweep.index));
            let mut writer = BufWriter::new(File::create(path).map_err(IoError::from)?);
            xyz::write_xyz(&mut writer, relaxed)?;
        }
    }
    Ok(())
}
