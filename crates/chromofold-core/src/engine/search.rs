use crate::core::models::{Constraint, Model};
use crate::engine::comparison::{self, FitScore};
use crate::engine::config::{ConversionConfig, OptimizerConfig, SearchConfig};
use crate::engine::conversion;
use crate::engine::error::EngineError;
use crate::engine::optimizer::{OptimizationReport, OptimizerState, StructureOptimizer};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::task::CancellationToken;
use std::cmp::Ordering;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Golden-ratio stride between per-run seeds, so restarts never share one.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// The winning run of a factor search.
#[derive(Debug, Clone)]
pub struct CandidateModel {
    pub factor: f64,
    pub seed: u64,
    pub model: Model,
    pub fit: FitScore,
    pub report: OptimizationReport,
}

/// Best scores observed for one grid factor.
///
/// When every restart of the factor failed, the scores are NaN and
/// `failed_runs` equals the restart count.
#[derive(Debug, Clone, Copy)]
pub struct FactorSummary {
    pub factor: f64,
    pub correlation: f64,
    pub objective: f64,
    pub failed_runs: usize,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub best: CandidateModel,
    pub factors: Vec<FactorSummary>,
    pub total_runs: usize,
    pub failed_runs: usize,
}

struct RunOutcome {
    factor_index: usize,
    factor: f64,
    seed: u64,
    model: Model,
    report: OptimizationReport,
    fit: FitScore,
}

/// The inclusive factor grid, generated by index so the step never drifts.
pub fn factor_grid(config: &SearchConfig) -> Vec<f64> {
    let mut grid = Vec::new();
    let mut index = 0usize;
    loop {
        let factor = config.start + index as f64 * config.step;
        if factor > config.end + config.step * 0.5 {
            break;
        }
        grid.push(factor);
        index += 1;
    }
    grid
}

/// Grid search over the convert factor.
///
/// Every `(factor, restart)` cell runs an independent optimization from its
/// own seeded starting structure. Runs execute in parallel, but selection
/// walks the outcomes in grid order, so the winner is the same no matter how
/// the runs were scheduled: highest fit correlation, then lowest objective,
/// then the earliest factor.
pub struct FactorSearch<'a> {
    constraints: &'a [Constraint],
    num_loci: usize,
    base_seed: u64,
    config: &'a SearchConfig,
    conversion: &'a ConversionConfig,
    optimizer: &'a OptimizerConfig,
    initial: Option<&'a Model>,
}

impl<'a> FactorSearch<'a> {
    pub fn new(
        constraints: &'a [Constraint],
        num_loci: usize,
        base_seed: u64,
        config: &'a SearchConfig,
        conversion: &'a ConversionConfig,
        optimizer: &'a OptimizerConfig,
    ) -> Self {
        Self {
            constraints,
            num_loci,
            base_seed,
            config,
            conversion,
            optimizer,
            initial: None,
        }
    }

    /// Starts every run from `model` instead of a seeded random structure.
    ///
    /// The model must already have exactly `num_loci` loci.
    pub fn with_initial(mut self, model: &'a Model) -> Self {
        self.initial = Some(model);
        self
    }

    pub fn run(
        &self,
        reporter: &ProgressReporter<'_>,
        token: &CancellationToken,
    ) -> Result<SearchReport, EngineError> {
        let grid = factor_grid(self.config);
        let total_runs = grid.len() * self.config.restarts;
        info!(
            factors = grid.len(),
            restarts = self.config.restarts,
            total_runs,
            "starting convert-factor search"
        );
        reporter.report(Progress::PhaseStart {
            name: "Factor Search",
        });
        reporter.report(Progress::TaskStart {
            total_steps: total_runs as u64,
        });

        let specs: Vec<(usize, f64, u64)> = grid
            .iter()
            .enumerate()
            .flat_map(|(factor_index, &factor)| {
                (0..self.config.restarts).map(move |restart| {
                    let run_index = factor_index * self.config.restarts + restart;
                    let seed = self
                        .base_seed
                        .wrapping_add((run_index as u64).wrapping_mul(SEED_STRIDE));
                    (factor_index, factor, seed)
                })
            })
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes: Result<Vec<RunOutcome>, EngineError> = specs
            .par_iter()
            .map(|&spec| self.execute(spec, reporter, token))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Result<Vec<RunOutcome>, EngineError> = specs
            .iter()
            .map(|&spec| self.execute(spec, reporter, token))
            .collect();
        let mut outcomes = outcomes?;

        let factors = self.summarize(&grid, &outcomes);
        for summary in &factors {
            reporter.report(Progress::FactorEvaluated {
                factor: summary.factor,
                correlation: summary.correlation,
            });
            debug!(
                factor = summary.factor,
                correlation = summary.correlation,
                objective = summary.objective,
                failed_runs = summary.failed_runs,
                "factor evaluated"
            );
        }
        let failed_runs = factors.iter().map(|f| f.failed_runs).sum();

        let best_index = select_best(&outcomes).ok_or(EngineError::AllRunsFailed {
            runs: total_runs,
        })?;
        let winner = outcomes.swap_remove(best_index);
        info!(
            factor = winner.factor,
            correlation = winner.fit.correlation,
            objective = winner.report.objective,
            "search selected a factor"
        );
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        Ok(SearchReport {
            best: CandidateModel {
                factor: winner.factor,
                seed: winner.seed,
                model: winner.model,
                fit: winner.fit,
                report: winner.report,
            },
            factors,
            total_runs,
            failed_runs,
        })
    }

    fn execute(
        &self,
        (factor_index, factor, seed): (usize, f64, u64),
        reporter: &ProgressReporter<'_>,
        token: &CancellationToken,
    ) -> Result<RunOutcome, EngineError> {
        token.check()?;
        let mut constraints = self.constraints.to_vec();
        conversion::assign_target_distances(&mut constraints, factor, self.conversion);

        let mut optimizer = StructureOptimizer::new(constraints, self.optimizer.clone())?;
        let initial = match self.initial {
            Some(model) => model.clone(),
            None => Model::seeded_random(self.num_loci, seed),
        };
        // Iteration-level progress stays silent here; the search reports
        // one increment per finished run instead.
        let (model, report) = optimizer.run(initial, &ProgressReporter::new(), token)?;
        let fit = comparison::fit(&model, optimizer.constraints());
        reporter.report(Progress::TaskIncrement);

        Ok(RunOutcome {
            factor_index,
            factor,
            seed,
            model,
            report,
            fit,
        })
    }

    fn summarize(&self, grid: &[f64], outcomes: &[RunOutcome]) -> Vec<FactorSummary> {
        grid.iter()
            .enumerate()
            .map(|(factor_index, &factor)| {
                let runs = outcomes.iter().filter(|o| o.factor_index == factor_index);
                let failed_runs = runs
                    .clone()
                    .filter(|o| o.report.state == OptimizerState::Failed)
                    .count();
                let best = runs
                    .filter(|o| o.report.state != OptimizerState::Failed)
                    .max_by(|a, b| {
                        a.fit
                            .correlation
                            .total_cmp(&b.fit.correlation)
                            .then(b.report.objective.total_cmp(&a.report.objective))
                    });
                match best {
                    Some(run) => FactorSummary {
                        factor,
                        correlation: run.fit.correlation,
                        objective: run.report.objective,
                        failed_runs,
                    },
                    None => FactorSummary {
                        factor,
                        correlation: f64::NAN,
                        objective: f64::NAN,
                        failed_runs,
                    },
                }
            })
            .collect()
    }
}

/// Index of the winning run, or `None` when every run failed.
fn select_best(outcomes: &[RunOutcome]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, outcome) in outcomes.iter().enumerate() {
        if outcome.report.state == OptimizerState::Failed {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => {
                let current = &outcomes[current];
                match outcome.fit.correlation.total_cmp(&current.fit.correlation) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => outcome.report.objective < current.report.objective,
                }
            }
        };
        if better {
            best = Some(index);
        }
    }
    best
}
