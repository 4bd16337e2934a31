use crate::cli::RunArgs;
use crate::config::RunFile;
use crate::error::Result;
use crate::progress::CliProgressHandler;
use sgmc::engine::error::EngineError;
use sgmc::engine::progress::ProgressReporter;
use sgmc::workflows;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let file = RunFile::from_file(&args.config)?;
    let mut config = file.to_engine_config()?;

    if let Some(num_sweeps) = args.num_sweeps {
        config.num_sweeps = num_sweeps;
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.testing {
        config.testing = true;
    }
    config.validate().map_err(EngineError::from)?;

    info!("Building slab geometry...");
    let (slab, sites) = file.build_geometry()?;
    let mut oracle = file.build_oracle(slab.len());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting annealing run...");
    let result = workflows::anneal::run(
        slab,
        sites,
        config,
        &mut oracle,
        &reporter,
        Some(args.output.as_path()),
    )?;

    let energies = result.energy_history();
    let best = energies.iter().copied().fold(f64::INFINITY, f64::min);
    let last = energies.last().copied().unwrap_or(0.0);
    info!(
        sweeps = result.sweeps.len(),
        best_energy = best,
        "annealing run complete"
    );
    println!(
        "✓ Run complete: {} sweeps, final energy {:.4}, best energy {:.4}",
        result.sweeps.len(),
        last,
        best
    );
    println!("  Artifacts written to: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(dir: &std::path::Path, testing: bool) -> PathBuf {
        let path = dir.join("run.toml");
        let text = format!(
            r#"
            [lattice]
            element = "Cu"
            lattice-constant = 3.6147
            size = [3, 3, 2]

            [ensemble]
            kind = "grand-canonical"
            num-sweeps = 3
            temperature = 1.0
            adsorbates = ["O"]
            testing = {testing}
            seed = 9

            [energy]
            cutoff = 8.0

            [energy.pair.Cu]
            epsilon = 0.2
            sigma = 2.3

            [energy.pair.O]
            epsilon = 0.1
            sigma = 2.7
        "#
        );
        std::fs::write(&path, text).unwrap();
        path
    }

    fn args(config: PathBuf, output: PathBuf) -> RunArgs {
        RunArgs {
            config,
            output,
            num_sweeps: None,
            temperature: None,
            seed: None,
            testing: false,
        }
    }

    #[test]
    fn run_produces_history_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), true);
        let output = dir.path().join("out");

        run(args(config, output.clone())).unwrap();

        let history = std::fs::read_to_string(output.join("history.csv")).unwrap();
        assert_eq!(history.lines().count(), 4);
        assert!(output.join("sweep_00000.xyz").exists());
        assert!(output.join("sweep_00002.xyz").exists());
    }

    #[test]
    fn metropolis_run_with_pair_potential_completes() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), false);
        let output = dir.path().join("out");

        let mut a = args(config, output.clone());
        a.num_sweeps = Some(2);
        run(a).unwrap();

        let history = std::fs::read_to_string(output.join("history.csv")).unwrap();
        assert_eq!(history.lines().count(), 3);
    }

    #[test]
    fn missing_config_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(args(
            dir.path().join("absent.toml"),
            dir.path().join("out"),
        ))
        .unwrap_err();
        assert!(matches!(err, crate::error::CliError::FileParsing { .. }));
    }
}
