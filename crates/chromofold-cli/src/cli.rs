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
    author = "The chromofold developers",
    version,
    about = "chromofold CLI - A command-line interface for chromofold, a constraint-based engine for reconstructing 3D chromosome and genome models from Hi-C interaction frequencies.",
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

    /// Set the number of threads for parallel computation (1 to 120).
    /// Defaults to the number of available logical cores, capped at 120.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct a 3D chromosome or genome model from Hi-C contact data.
    Reconstruct(ReconstructArgs),
    /// Compare two reconstructed models through their pairwise distance profiles.
    Compare(CompareArgs),
}

/// Arguments for the `reconstruct` subcommand.
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    // --- Core Arguments ---
    /// Path to the input contact list (whitespace- or colon-separated
    /// `locus locus value` triples).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory where the model, exports, and run summary are written.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat the input as ready-made target distances instead of interaction
    /// frequencies, skipping conversion and the factor search.
    #[arg(long)]
    pub distances: bool,

    // --- Conversion Overrides ---
    /// Fix the conversion exponent, disabling the factor search.
    #[arg(short = 'f', long, value_name = "FLOAT")]
    pub convert_factor: Option<f64>,

    /// Override the first candidate of the factor search grid.
    #[arg(long, value_name = "FLOAT")]
    pub factor_start: Option<f64>,

    /// Override the last candidate of the factor search grid.
    #[arg(long, value_name = "FLOAT")]
    pub factor_end: Option<f64>,

    /// Override the spacing of the factor search grid.
    #[arg(long, value_name = "FLOAT")]
    pub factor_step: Option<f64>,

    /// Override the number of random restarts per candidate factor.
    #[arg(short, long, value_name = "INT")]
    pub restarts: Option<usize>,

    /// Keep converted distances on their raw power-law scale instead of
    /// rescaling them to the canonical mean.
    #[arg(long)]
    pub keep_original_scale: bool,

    // --- Optimization Overrides ---
    /// Override the initial line-search step size.
    #[arg(long, value_name = "FLOAT")]
    pub learning_rate: Option<f64>,

    /// Override the maximum number of optimization iterations per run.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override the gradient-norm convergence threshold.
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    // --- Structure Overrides ---
    /// Start every optimization run from the coordinates in this model file
    /// instead of a random structure.
    #[arg(long, value_name = "PATH")]
    pub initial_model: Option<PathBuf>,

    /// Per-chromosome locus counts for a genome-wide run, comma-separated.
    #[arg(long, value_name = "N,N,...", value_delimiter = ',')]
    pub chromosome_lengths: Option<Vec<usize>>,

    /// Disable the insertion of missing adjacent-locus contacts.
    #[arg(long)]
    pub no_adjacent_augmentation: bool,

    /// Base seed for the random initial structures; runs with the same seed
    /// reproduce the same model bit for bit.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First model file in the per-locus coordinate format.
    #[arg(required = true, value_name = "PATH")]
    pub first: PathBuf,

    /// Second model file to compare against the first.
    #[arg(required = true, value_name = "PATH")]
    pub second: PathBuf,
}
