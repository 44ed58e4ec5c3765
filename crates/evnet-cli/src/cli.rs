use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "EV charging network capacity planner", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan station counts for a problem instance
    Solve {
        /// Problem instance (JSON or YAML)
        #[arg(long, value_hint = ValueHint::FilePath)]
        instance: PathBuf,
        /// Write the plan summary as JSON
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        /// Local-search iterations (overrides the instance)
        #[arg(long)]
        iterations: Option<usize>,
        /// RNG seed for pair sampling (overrides the instance)
        #[arg(long)]
        seed: Option<u64>,
        /// MILP backend for the relaxation (microlp, highs)
        #[arg(long)]
        solver: Option<String>,
        /// Relative MIP gap tolerance (highs only)
        #[arg(long)]
        mip_gap: Option<f64>,
        /// Relaxation time limit in seconds (highs only)
        #[arg(long)]
        time_limit: Option<f64>,
        /// Solver output and per-iteration progress
        #[arg(long)]
        verbose: bool,
    },
    /// Generate a synthetic problem instance
    Generate {
        /// Generator config (YAML or JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: PathBuf,
        /// Output instance path (.json, .yaml or .yml)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
        /// RNG seed (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check a problem instance without solving it
    Validate {
        /// Problem instance (JSON or YAML)
        #[arg(long, value_hint = ValueHint::FilePath)]
        instance: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
