use crate::core::io::contacts::{ContactRecord, DistanceRecord};
use crate::core::models::{ChromosomeSpans, Constraint, Model};
use crate::engine::comparison::{self, FitScore};
use crate::engine::config::{FactorMode, OptimizerConfig, ReconstructionConfig};
use crate::engine::constraints::{AugmentationSummary, ConstraintSet, IngestStats};
use crate::engine::conversion;
use crate::engine::error::EngineError;
use crate::engine::optimizer::{OptimizationReport, OptimizerState, StructureOptimizer};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::search::{FactorSearch, SearchReport};
use crate::engine::task::CancellationToken;
use rand::RngCore;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// The source records for one reconstruction.
#[derive(Debug, Clone)]
pub enum ReconstructionInput {
    /// Interaction frequencies, converted into target distances before
    /// optimization.
    Contacts(Vec<ContactRecord>),
    /// Ready-made target distances, used verbatim. This path skips
    /// filtering, augmentation, and the convert-factor search.
    TargetDistances(Vec<DistanceRecord>),
}

#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    pub model: Model,
    /// The factor the targets were derived with; `None` on the
    /// target-distance path.
    pub convert_factor: Option<f64>,
    pub fit: FitScore,
    pub optimization: OptimizationReport,
    /// Filter statistics; `None` on the target-distance path.
    pub ingest: Option<IngestStats>,
    pub augmentation: Option<AugmentationSummary>,
    pub spans: ChromosomeSpans,
    /// The base seed the run actually used, whether configured or drawn
    /// from entropy.
    pub seed: u64,
    pub search: Option<SearchReport>,
    pub num_constraints: usize,
    pub elapsed: Duration,
}

/// Reconstructs a 3D model from interaction data.
///
/// An `initial` model, when given, replaces the seeded random starting
/// structure: a larger model is truncated to the run's locus count, a
/// smaller one is a [`EngineError::DimensionMismatch`].
#[instrument(skip_all, name = "reconstruction_workflow")]
pub fn run(
    input: &ReconstructionInput,
    initial: Option<Model>,
    config: &ReconstructionConfig,
    reporter: &ProgressReporter<'_>,
    token: &CancellationToken,
) -> Result<ReconstructionResult, EngineError> {
    let started = Instant::now();
    let seed = match config.seed {
        Some(seed) => seed,
        None => rand::thread_rng().next_u64(),
    };
    info!(seed, "starting reconstruction");

    match input {
        ReconstructionInput::Contacts(records) => {
            reconstruct_from_contacts(records, initial, config, seed, started, reporter, token)
        }
        ReconstructionInput::TargetDistances(records) => {
            reconstruct_from_distances(records, initial, config, seed, started, reporter, token)
        }
    }
}

fn reconstruct_from_contacts(
    records: &[ContactRecord],
    initial: Option<Model>,
    config: &ReconstructionConfig,
    seed: u64,
    started: Instant,
    reporter: &ProgressReporter<'_>,
    token: &CancellationToken,
) -> Result<ReconstructionResult, EngineError> {
    // === Phase 1: Ingest, filter, and augment ===
    reporter.report(Progress::PhaseStart { name: "Ingest" });
    let mut set = ConstraintSet::new();
    let stats = set.ingest_records(records, &config.filter);
    if set.is_empty() {
        return Err(EngineError::EmptyConstraintSet {
            records: stats.total_records(),
        });
    }
    info!(
        accepted = stats.accepted,
        replaced = stats.replaced,
        rejected = stats.rejected(),
        "ingested contact records"
    );

    let spans = resolve_spans(config, set.num_loci())?;
    let augmentation = if config.augment_adjacency {
        set.augment_adjacency(&spans)
    } else {
        None
    };
    let base = set.to_constraints();
    let num_constraints = base.len();
    let num_loci = spans.num_loci();
    reporter.report(Progress::PhaseFinish);
    token.check()?;

    let initial = match initial {
        Some(model) => Some(resize_initial(model, num_loci)?),
        None => None,
    };

    // === Phase 2: Optimize, searching the factor grid unless it is fixed ===
    let (model, report, fit, factor, search) = match &config.factor {
        FactorMode::Fixed(factor) => {
            let mut constraints = base;
            conversion::assign_target_distances(&mut constraints, *factor, &config.conversion);
            let starting = initial.unwrap_or_else(|| Model::seeded_random(num_loci, seed));

            reporter.report(Progress::PhaseStart {
                name: "Optimization",
            });
            let (model, report, fit) =
                single_run(constraints, starting, &config.optimizer, reporter, token)?;
            reporter.report(Progress::PhaseFinish);
            (model, report, fit, *factor, None)
        }
        FactorMode::Search(search_config) => {
            let mut search = FactorSearch::new(
                &base,
                num_loci,
                seed,
                search_config,
                &config.conversion,
                &config.optimizer,
            );
            if let Some(model) = &initial {
                search = search.with_initial(model);
            }
            let search_report = search.run(reporter, token)?;
            let best = search_report.best.clone();
            (
                best.model,
                best.report,
                best.fit,
                best.factor,
                Some(search_report),
            )
        }
    };

    info!(
        factor,
        correlation = fit.correlation,
        objective = report.objective,
        "reconstruction finished"
    );
    Ok(ReconstructionResult {
        model,
        convert_factor: Some(factor),
        fit,
        optimization: report,
        ingest: Some(stats),
        augmentation,
        spans,
        seed,
        search,
        num_constraints,
        elapsed: started.elapsed(),
    })
}

fn reconstruct_from_distances(
    records: &[DistanceRecord],
    initial: Option<Model>,
    config: &ReconstructionConfig,
    seed: u64,
    started: Instant,
    reporter: &ProgressReporter<'_>,
    token: &CancellationToken,
) -> Result<ReconstructionResult, EngineError> {
    // === Phase 1: Adopt the supplied targets ===
    reporter.report(Progress::PhaseStart { name: "Ingest" });
    let constraints = conversion::constraints_from_distances(records)?;
    if constraints.is_empty() {
        return Err(EngineError::EmptyConstraintSet {
            records: records.len(),
        });
    }
    let data_loci = constraints
        .iter()
        .map(|c| c.pos2() as usize + 1)
        .max()
        .unwrap_or(0);
    let spans = resolve_spans(config, data_loci)?;
    let num_constraints = constraints.len();
    let num_loci = spans.num_loci();
    info!(num_constraints, num_loci, "adopted target distances");
    reporter.report(Progress::PhaseFinish);
    token.check()?;

    // === Phase 2: One optimization run against the given targets ===
    let starting = match initial {
        Some(model) => resize_initial(model, num_loci)?,
        None => Model::seeded_random(num_loci, seed),
    };
    reporter.report(Progress::PhaseStart {
        name: "Optimization",
    });
    let (model, report, fit) =
        single_run(constraints, starting, &config.optimizer, reporter, token)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        correlation = fit.correlation,
        objective = report.objective,
        "reconstruction finished"
    );
    Ok(ReconstructionResult {
        model,
        convert_factor: None,
        fit,
        optimization: report,
        ingest: None,
        augmentation: None,
        spans,
        seed,
        search: None,
        num_constraints,
        elapsed: started.elapsed(),
    })
}

/// Spans from the configured lengths, or one span covering the data.
fn resolve_spans(
    config: &ReconstructionConfig,
    data_loci: usize,
) -> Result<ChromosomeSpans, EngineError> {
    match &config.chromosome_lengths {
        Some(lengths) => {
            let spans = ChromosomeSpans::from_lengths(lengths)?;
            if spans.num_loci() < data_loci {
                return Err(EngineError::LocusOutOfRange {
                    locus: data_loci as u32 - 1,
                    total: spans.num_loci(),
                });
            }
            Ok(spans)
        }
        None => Ok(ChromosomeSpans::single(data_loci)),
    }
}

fn resize_initial(model: Model, num_loci: usize) -> Result<Model, EngineError> {
    if model.len() < num_loci {
        return Err(EngineError::DimensionMismatch {
            expected: num_loci,
            actual: model.len(),
        });
    }
    if model.len() > num_loci {
        info!(
            from = model.len(),
            to = num_loci,
            "truncating the initial model to the run's loci"
        );
    }
    Ok(model.truncated(num_loci))
}

/// One optimization run with task-level progress framing.
///
/// A run that diverges into non-finite values produces no usable model, so
/// it surfaces as [`EngineError::AllRunsFailed`] here; hitting the iteration
/// cap does not.
fn single_run(
    constraints: Vec<Constraint>,
    starting: Model,
    config: &OptimizerConfig,
    reporter: &ProgressReporter<'_>,
    token: &CancellationToken,
) -> Result<(Model, OptimizationReport, FitScore), EngineError> {
    reporter.report(Progress::TaskStart {
        total_steps: config.max_iterations as u64,
    });
    let mut optimizer = StructureOptimizer::new(constraints, config.clone())?;
    let (model, report) = optimizer.run(starting, reporter, token)?;
    reporter.report(Progress::TaskFinish);

    if report.state == OptimizerState::Failed {
        return Err(EngineError::AllRunsFailed { runs: 1 });
    }
    let fit = comparison::fit(&model, optimizer.constraints());
    Ok((model, report, fit))
}
