use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "sgmc - semi-grand canonical Monte Carlo sampling of adsorbate configurations on crystal surfaces.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an annealing chain from a TOML configuration file.
    Run(RunArgs),
    /// Write an annotated configuration template to get started.
    Init(InitArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory for run artifacts (history table and per-sweep snapshots).
    #[arg(short, long, value_name = "DIR", default_value = "sgmc-out")]
    pub output: PathBuf,

    // --- Overrides ---
    /// Override the number of sweeps from the config file.
    #[arg(short, long, value_name = "INT")]
    pub num_sweeps: Option<usize>,

    /// Override the initial temperature from the config file.
    #[arg(short, long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Override the random seed from the config file.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Accept every trial unconditionally (state-machine testing mode).
    #[arg(long)]
    pub testing: bool,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration template.
    #[arg(value_name = "PATH", default_value = "sgmc.toml")]
    pub path: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}
