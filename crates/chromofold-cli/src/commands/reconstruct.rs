use crate::cli::ReconstructArgs;
use crate::config::PartialReconstructionConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use chromofold::core::io::contacts::{read_contacts_from_path, read_distances_from_path};
use chromofold::core::io::coords::{
    read_model_from_path, write_mapping_to_path, write_model_to_path,
};
use chromofold::core::io::pdb::write_pdb_to_path;
use chromofold::engine::config::ReconstructionConfig;
use chromofold::engine::optimizer::{OptimizerState, Termination};
use chromofold::engine::progress::ProgressReporter;
use chromofold::engine::task::CancellationToken;
use chromofold::workflows::reconstruct::{self, ReconstructionInput, ReconstructionResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: ReconstructArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialReconstructionConfig::from_file(path)?,
        None => PartialReconstructionConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let input = if args.distances {
        let ignored = dead_conversion_overrides(&args);
        if !ignored.is_empty() {
            warn!(
                "Ignoring {}: target distances skip conversion and the factor search.",
                ignored.join(", ")
            );
        }
        info!("Loading target distances from {:?}", &args.input);
        let records = read_distances_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
        ReconstructionInput::TargetDistances(records)
    } else {
        info!("Loading contact records from {:?}", &args.input);
        let records = read_contacts_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
        ReconstructionInput::Contacts(records)
    };

    let initial = match &args.initial_model {
        Some(path) => {
            info!("Loading initial model from {:?}", path);
            Some(
                read_model_from_path(path).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?,
            )
        }
        None => None,
    };

    std::fs::create_dir_all(&args.output)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let token = CancellationToken::new();

    println!("Starting reconstruction...");
    info!("Invoking the core reconstruction workflow...");
    let result = reconstruct::run(&input, initial, &config, &reporter, &token)?;

    info!(
        loci = result.model.len(),
        correlation = result.fit.correlation,
        "Workflow finished."
    );
    write_outputs(&args, &config, &result)
}

// The conversion and search stages never run on the target-distance path.
fn dead_conversion_overrides(args: &ReconstructArgs) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    if args.convert_factor.is_some() {
        ignored.push("--convert-factor");
    }
    if args.factor_start.is_some() {
        ignored.push("--factor-start");
    }
    if args.factor_end.is_some() {
        ignored.push("--factor-end");
    }
    if args.factor_step.is_some() {
        ignored.push("--factor-step");
    }
    if args.restarts.is_some() {
        ignored.push("--restarts");
    }
    if args.keep_original_scale {
        ignored.push("--keep-original-scale");
    }
    ignored
}

fn write_outputs(
    args: &ReconstructArgs,
    config: &ReconstructionConfig,
    result: &ReconstructionResult,
) -> Result<()> {
    let stem = args
        .input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");

    let model_path = output_path(&args.output, stem, "_model.txt");
    write_model_to_path(&result.model, &model_path).map_err(|e| CliError::FileParsing {
        path: model_path.clone(),
        source: e.into(),
    })?;

    let pdb_path = output_path(&args.output, stem, ".pdb");
    write_pdb_to_path(&result.model, &result.spans, &pdb_path).map_err(|e| {
        CliError::FileParsing {
            path: pdb_path.clone(),
            source: e.into(),
        }
    })?;

    let mapping_path = if config.chromosome_lengths.is_some() {
        let path = output_path(&args.output, stem, "_mapping.txt");
        write_mapping_to_path(&result.spans, &path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        Some(path)
    } else {
        None
    };

    let summary_path = output_path(&args.output, stem, "_summary.txt");
    std::fs::write(&summary_path, render_summary(args, result))?;

    println!("✓ Model written to: {}", model_path.display());
    println!("  PDB export written to: {}", pdb_path.display());
    if let Some(path) = &mapping_path {
        println!("  Chromosome mapping written to: {}", path.display());
    }
    println!("  Run summary written to: {}", summary_path.display());
    println!(
        "  Fit correlation: {:.6} (RMSE {:.6})",
        result.fit.correlation, result.fit.rmse
    );

    Ok(())
}

fn output_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{stem}{suffix}"))
}

fn render_summary(args: &ReconstructArgs, result: &ReconstructionResult) -> String {
    let mut lines = vec![
        "chromofold run summary".to_string(),
        "======================".to_string(),
        format!("input: {}", args.input.display()),
        format!("loci: {}", result.model.len()),
        format!("constraints: {}", result.num_constraints),
        format!("convert factor: {}", factor_label(result)),
        format!("seed: {}", result.seed),
        format!("elapsed: {:.3} s", result.elapsed.as_secs_f64()),
        String::new(),
        "optimization".to_string(),
        format!("  state: {}", state_label(result.optimization.state)),
        format!(
            "  termination: {}",
            termination_label(result.optimization.termination)
        ),
        format!("  iterations: {}", result.optimization.iterations),
        format!("  final objective: {:.6}", result.optimization.objective),
        format!(
            "  gradient norm: {:.6e}",
            result.optimization.gradient_norm
        ),
        String::new(),
        "fit to targets".to_string(),
        format!("  correlation: {:.6}", result.fit.correlation),
        format!("  rmse: {:.6}", result.fit.rmse),
    ];

    if let Some(ingest) = &result.ingest {
        lines.push(String::new());
        lines.push("ingest".to_string());
        lines.push(format!("  records: {}", ingest.total_records()));
        lines.push(format!("  accepted: {}", ingest.accepted));
        lines.push(format!("  replaced: {}", ingest.replaced));
        lines.push(format!(
            "  rejected self pairs: {}",
            ingest.rejected_self_pairs
        ));
        lines.push(format!(
            "  rejected non-finite: {}",
            ingest.rejected_non_finite
        ));
        lines.push(format!(
            "  rejected below threshold: {}",
            ingest.rejected_threshold
        ));
        lines.push(format!(
            "  rejected outside separation window: {}",
            ingest.rejected_separation
        ));
    }

    if let Some(augmentation) = &result.augmentation {
        lines.push(String::new());
        lines.push("adjacency augmentation".to_string());
        lines.push(format!("  inserted: {}", augmentation.inserted));
        lines.push(format!("  raised: {}", augmentation.raised));
        lines.push(format!(
            "  adjacent mean frequency: {:.6}",
            augmentation.adjacent_mean
        ));
    }

    if let Some(search) = &result.search {
        lines.push(String::new());
        lines.push("factor search".to_string());
        lines.push(format!(
            "  runs: {} total, {} failed",
            search.total_runs, search.failed_runs
        ));
        for factor in &search.factors {
            lines.push(format!(
                "  factor {:.2}: correlation {:.6}, objective {:.6} ({} failed)",
                factor.factor, factor.correlation, factor.objective, factor.failed_runs
            ));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn factor_label(result: &ReconstructionResult) -> String {
    match result.convert_factor {
        Some(factor) if result.search.is_some() => format!("{factor:.2} (searched)"),
        Some(factor) => format!("{factor:.2} (fixed)"),
        None => "none (target distances used verbatim)".to_string(),
    }
}

fn state_label(state: OptimizerState) -> &'static str {
    match state {
        OptimizerState::Initialized => "initialized",
        OptimizerState::Iterating => "iterating",
        OptimizerState::Converged => "converged",
        OptimizerState::MaxIterReached => "iteration cap reached",
        OptimizerState::Failed => "failed",
    }
}

fn termination_label(termination: Termination) -> String {
    match termination {
        Termination::GradientBelowThreshold => "gradient below threshold".to_string(),
        Termination::StepUnderflow => "line-search step underflow".to_string(),
        Termination::IterationCap => "iteration cap".to_string(),
        Termination::NonFinite { iteration } => {
            format!("non-finite value at iteration {iteration}")
        }
    }
}
