use crate::cli::InitArgs;
use crate::error::{CliError, Result};
use tracing::info;

pub const TEMPLATE: &str = r#"# sgmc run configuration.
# Start from this template, then `sgmc run -c <this file>`.

[lattice]
element = "Cu"
lattice-constant = 3.6147
# [nx, ny, layers]
size = [4, 4, 3]
vacuum = 15.0
site-height = 2.0

[ensemble]
# "grand-canonical" (fluctuating adsorbate count against a reservoir) or
# "canonical" (fixed count; also set num-ads-atoms).
kind = "grand-canonical"
num-sweeps = 100
temperature = 1.0
# Geometric annealing factor in (0, 1]; 1.0 is constant temperature.
alpha = 0.99
adsorbates = ["O"]
# Optional: restrict flips to one site class (1 = top, 2 = bridge, 4 = hollow).
# site-class = 4
seed = 42

[ensemble.chemical-potentials]
O = -1.5

[energy]
cutoff = 8.0
relax = false
# relax-steps = 20
# relax-step-size = 0.05
# relax-force-tolerance = 0.2
# energy-threshold = 1000.0
# force-threshold = 50.0

[energy.pair.Cu]
epsilon = 0.2
sigma = 2.3

[energy.pair.O]
epsilon = 0.1
sigma = 2.7

# Optional offset correction toward referenced formation energies:
# [offset]
# reference-csv = "offsets.csv"
# reference-element = "Ti"
"#;

pub fn run(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(CliError::Argument(format!(
            "'{}' already exists; pass --force to overwrite",
            args.path.display()
        )));
    }
    std::fs::write(&args.path, TEMPLATE)?;
    info!(path = %args.path.display(), "configuration template written");
    println!("✓ Configuration template written to: {}", args.path.display());
    Ok(())
}
