mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use chromofold::core::constants;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let command_result = dispatch(cli);

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
            eprintln!("❌ Command failed: {}", e);
        }
    }

    command_result
}

fn dispatch(cli: Cli) -> Result<()> {
    info!(
        "🚀 chromofold CLI v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let num_threads = resolve_thread_count(cli.threads)?;
    info!(
        "Setting Rayon global thread pool to {} threads.",
        num_threads
    );
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| {
            CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
        })?;

    match cli.command {
        Commands::Reconstruct(args) => {
            info!("Dispatching to 'reconstruct' command.");
            commands::reconstruct::run(args)
        }
        Commands::Compare(args) => {
            info!("Dispatching to 'compare' command.");
            commands::compare::run(args)
        }
    }
}

// The pool is sized once per process; without an explicit count the core
// count is clamped to the same ceiling an explicit count is checked against.
fn resolve_thread_count(requested: Option<usize>) -> Result<usize> {
    match requested {
        Some(n) if n == 0 || n > constants::MAX_NUM_THREADS => Err(CliError::Argument(format!(
            "thread count must be between 1 and {}, got {}",
            constants::MAX_NUM_THREADS,
            n
        ))),
        Some(n) => Ok(n),
        None => Ok(std::thread::available_parallelism()
            .map_or(1, |p| p.get())
            .min(constants::MAX_NUM_THREADS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_thread_counts_pass_through_up_to_the_ceiling() {
        assert_eq!(resolve_thread_count(Some(8)).unwrap(), 8);
        assert_eq!(
            resolve_thread_count(Some(constants::MAX_NUM_THREADS)).unwrap(),
            constants::MAX_NUM_THREADS
        );
    }

    #[test]
    fn out_of_range_thread_counts_are_rejected() {
        assert!(resolve_thread_count(Some(0)).is_err());
        assert!(resolve_thread_count(Some(constants::MAX_NUM_THREADS + 1)).is_err());
    }

    #[test]
    fn the_default_thread_count_never_exceeds_the_ceiling() {
        let resolved = resolve_thread_count(None).unwrap();

        assert!(resolved >= 1);
        assert!(resolved <= constants::MAX_NUM_THREADS);
    }
}
