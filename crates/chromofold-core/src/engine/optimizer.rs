use crate::core::constants;
use crate::core::models::{Constraint, Model};
use crate::engine::config::OptimizerConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::task::CancellationToken;
use nalgebra::Vector3;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Constraints per parallel work unit when evaluating the objective.
const GRADIENT_CHUNK: usize = 1024;

/// Lifecycle of a gradient-descent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    Initialized,
    Iterating,
    Converged,
    MaxIterReached,
    Failed,
}

/// The stopping rule that ended a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// The gradient norm fell below the convergence threshold.
    GradientBelowThreshold,
    /// The line search could not find a productive step above the minimum
    /// step size; the structure is as settled as it will get.
    StepUnderflow,
    IterationCap,
    /// The objective or gradient left the finite range.
    NonFinite { iteration: usize },
}

/// Terminal summary of one optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationReport {
    pub state: OptimizerState,
    pub iterations: usize,
    pub objective: f64,
    pub gradient_norm: f64,
    pub termination: Termination,
    /// Objective after initialization and after every accepted step.
    pub objective_trace: Vec<f64>,
}

/// Minimizes the weighted stress of a structure against its constraints.
///
/// The objective is `sum(w * (x - d)^2)` over all constraints, where `x` is
/// the structural distance, `d` the target distance, and `w` the frequency
/// normalized by the mean frequency. Steps follow the negative gradient with
/// a backtracking line search, so the objective never increases while the
/// run is iterating.
pub struct StructureOptimizer {
    constraints: Vec<Constraint>,
    inv_mean_frequency: f64,
    config: OptimizerConfig,
    state: OptimizerState,
}

impl StructureOptimizer {
    pub fn new(constraints: Vec<Constraint>, config: OptimizerConfig) -> Result<Self, EngineError> {
        if constraints.is_empty() {
            return Err(EngineError::EmptyConstraintSet { records: 0 });
        }
        let mean_frequency =
            constraints.iter().map(|c| c.frequency).sum::<f64>() / constraints.len() as f64;
        Ok(Self {
            constraints,
            inv_mean_frequency: 1.0 / mean_frequency,
            config,
            state: OptimizerState::Initialized,
        })
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Constraints with the structural distances of the last evaluated model.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }

    /// Runs gradient descent from `model` until a terminal state is reached.
    ///
    /// Cancellation is honored between iterations and surfaces as
    /// [`EngineError::Cancelled`]; every other outcome, including a failed
    /// run, is reported through [`OptimizationReport::state`]. The caller
    /// owns task-level progress framing; this emits one
    /// [`Progress::TaskIncrement`] per accepted step.
    pub fn run(
        &mut self,
        model: Model,
        reporter: &ProgressReporter<'_>,
        token: &CancellationToken,
    ) -> Result<(Model, OptimizationReport), EngineError> {
        if let Some(constraint) = self
            .constraints
            .iter()
            .find(|c| c.pos2() as usize >= model.len())
        {
            return Err(EngineError::LocusOutOfRange {
                locus: constraint.pos2(),
                total: model.len(),
            });
        }

        self.state = OptimizerState::Iterating;
        let mut model = model;
        let mut step = self.config.learning_rate;
        let mut iterations = 0usize;

        let (mut objective, mut gradient) = self.evaluate(&model);
        let mut gradient_norm = norm(&gradient);
        let mut objective_trace = vec![objective];
        trace!(objective, gradient_norm, "initial evaluation");

        let termination = loop {
            token.check()?;

            if !objective.is_finite() || !gradient_norm.is_finite() {
                self.state = OptimizerState::Failed;
                break Termination::NonFinite {
                    iteration: iterations,
                };
            }
            if gradient_norm < self.config.convergence_threshold {
                self.state = OptimizerState::Converged;
                break Termination::GradientBelowThreshold;
            }
            if iterations >= self.config.max_iterations {
                self.state = OptimizerState::MaxIterReached;
                break Termination::IterationCap;
            }

            // Backtracking line search with the Armijo decrease condition.
            // Starting from twice the last accepted step lets the step size
            // grow back after a cautious stretch.
            let norm_squared = gradient_norm * gradient_norm;
            let mut trial = step * 2.0;
            let accepted = loop {
                if trial < constants::NEAR_ZERO {
                    break None;
                }
                let candidate = model.displaced(trial, &gradient);
                let candidate_objective = self.stress(&candidate);
                if candidate_objective <= objective - 0.5 * trial * norm_squared {
                    break Some((candidate, candidate_objective, trial));
                }
                trial *= 0.5;
            };

            match accepted {
                Some((candidate, _, accepted_step)) => {
                    model = candidate;
                    step = accepted_step;
                    iterations += 1;
                    (objective, gradient) = self.evaluate(&model);
                    gradient_norm = norm(&gradient);
                    objective_trace.push(objective);
                    trace!(
                        iteration = iterations,
                        objective,
                        gradient_norm,
                        step,
                        "accepted step"
                    );
                    reporter.report(Progress::TaskIncrement);
                }
                None => {
                    self.state = OptimizerState::Converged;
                    break Termination::StepUnderflow;
                }
            }
        };

        debug!(
            state = ?self.state,
            iterations,
            objective,
            gradient_norm,
            ?termination,
            "optimization finished"
        );
        Ok((
            model,
            OptimizationReport {
                state: self.state,
                iterations,
                objective,
                gradient_norm,
                termination,
                objective_trace,
            },
        ))
    }

    /// Computes the objective and its gradient, recording each constraint's
    /// structural distance as a side effect.
    ///
    /// Chunk results are combined in chunk order, so the sums are bitwise
    /// reproducible no matter how the chunks were scheduled.
    fn evaluate(&mut self, model: &Model) -> (f64, Vec<Vector3<f64>>) {
        let inv_mean = self.inv_mean_frequency;

        #[cfg(feature = "parallel")]
        let partials: Vec<_> = self
            .constraints
            .par_chunks_mut(GRADIENT_CHUNK)
            .map(|chunk| evaluate_chunk(chunk, model, inv_mean))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let partials: Vec<_> = self
            .constraints
            .chunks_mut(GRADIENT_CHUNK)
            .map(|chunk| evaluate_chunk(chunk, model, inv_mean))
            .collect();

        let mut objective = 0.0;
        let mut gradient = vec![Vector3::zeros(); model.len()];
        for (partial_objective, forces) in partials {
            objective += partial_objective;
            for (locus, force) in forces {
                gradient[locus as usize] += force;
            }
        }
        (objective, gradient)
    }

    /// Objective at a trial point, without touching stored state.
    fn stress(&self, model: &Model) -> f64 {
        let inv_mean = self.inv_mean_frequency;

        #[cfg(feature = "parallel")]
        let partials: Vec<f64> = self
            .constraints
            .par_chunks(GRADIENT_CHUNK)
            .map(|chunk| stress_chunk(chunk, model, inv_mean))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let partials: Vec<f64> = self
            .constraints
            .chunks(GRADIENT_CHUNK)
            .map(|chunk| stress_chunk(chunk, model, inv_mean))
            .collect();

        partials.iter().sum()
    }
}

fn norm(gradient: &[Vector3<f64>]) -> f64 {
    gradient.iter().map(|g| g.norm_squared()).sum::<f64>().sqrt()
}

fn evaluate_chunk(
    chunk: &mut [Constraint],
    model: &Model,
    inv_mean: f64,
) -> (f64, Vec<(u32, Vector3<f64>)>) {
    let mut objective = 0.0;
    let mut forces = Vec::with_capacity(chunk.len() * 2);
    for constraint in chunk {
        let (a, b) = constraint.pair();
        let delta = model.point(a as usize) - model.point(b as usize);
        let distance = delta.norm();
        constraint.structural_distance = distance;

        let weight = constraint.frequency * inv_mean;
        let diff = distance - constraint.target_distance;
        objective += weight * diff * diff;

        // Coincident points have no direction; the clamp keeps the force
        // finite and lets the next step separate them.
        let coefficient = 2.0 * weight * diff / distance.max(constants::NEAR_ZERO);
        let force = delta * coefficient;
        forces.push((a, force));
        forces.push((b, -force));
    }
    (objective, forces)
}

fn stress_chunk(chunk: &[Constraint], model: &Model, inv_mean: f64) -> f64 {
    let mut objective = 0.0;
    for constraint in chunk {
        let (a, b) = constraint.pair();
        let distance = model.distance(a as usize, b as usize);
        let weight = constraint.frequency * inv_mean;
        let diff = distance - constraint.target_distance;
        objective += weight * diff * diff;
    }
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(
        constraints: Vec<Constraint>,
        model: Model,
    ) -> Result<(Model, OptimizationReport), EngineError> {
        let mut optimizer = StructureOptimizer::new(constraints, OptimizerConfig::default())?;
        optimizer.run(model, &ProgressReporter::new(), &CancellationToken::default())
    }

    #[test]
    fn two_loci_settle_at_the_target_distance() {
        let constraints = vec![Constraint::with_target(0, 1, 1.0, 5.0)];
        let (model, report) = run(constraints, Model::seeded_random(2, 7)).unwrap();

        assert_eq!(report.state, OptimizerState::Converged);
        assert_eq!(report.termination, Termination::GradientBelowThreshold);
        assert_relative_eq!(model.distance(0, 1), 5.0, epsilon = 1e-3);
    }

    #[test]
    fn objective_never_increases_across_accepted_steps() {
        let constraints = vec![
            Constraint::with_target(0, 1, 2.0, 3.0),
            Constraint::with_target(1, 2, 1.0, 4.0),
            Constraint::with_target(2, 3, 1.0, 2.0),
            Constraint::with_target(0, 3, 0.5, 8.0),
        ];
        let (_, report) = run(constraints, Model::seeded_random(4, 11)).unwrap();

        assert!(report.objective_trace.len() > 1);
        for pair in report.objective_trace.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn non_finite_targets_fail_the_run() {
        let constraints = vec![Constraint::with_target(0, 1, 1.0, f64::NAN)];
        let (_, report) = run(constraints, Model::seeded_random(2, 3)).unwrap();

        assert_eq!(report.state, OptimizerState::Failed);
        assert_eq!(report.termination, Termination::NonFinite { iteration: 0 });
    }

    #[test]
    fn cancellation_surfaces_as_an_error() {
        let token = CancellationToken::default();
        token.cancel();
        let constraints = vec![Constraint::with_target(0, 1, 1.0, 5.0)];
        let mut optimizer =
            StructureOptimizer::new(constraints, OptimizerConfig::default()).unwrap();

        let result = optimizer.run(Model::seeded_random(2, 1), &ProgressReporter::new(), &token);
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[test]
    fn constraints_beyond_the_model_are_rejected() {
        let constraints = vec![Constraint::with_target(0, 5, 1.0, 2.0)];
        let result = run(constraints, Model::seeded_random(2, 1));

        assert!(matches!(
            result,
            Err(EngineError::LocusOutOfRange { locus: 5, total: 2 })
        ));
    }

    #[test]
    fn an_empty_constraint_set_cannot_be_optimized() {
        let result = StructureOptimizer::new(Vec::new(), OptimizerConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::EmptyConstraintSet { .. })
        ));
    }

    #[test]
    fn iteration_cap_is_a_terminal_state_not_an_error() {
        let config = OptimizerConfig {
            max_iterations: 1,
            ..OptimizerConfig::default()
        };
        let constraints = vec![
            Constraint::with_target(0, 1, 1.0, 5.0),
            Constraint::with_target(1, 2, 1.0, 3.0),
        ];
        let mut optimizer = StructureOptimizer::new(constraints, config).unwrap();
        let (_, report) = optimizer
            .run(
                Model::seeded_random(3, 2),
                &ProgressReporter::new(),
                &CancellationToken::default(),
            )
            .unwrap();

        assert_eq!(report.state, OptimizerState::MaxIterReached);
        assert_eq!(report.termination, Termination::IterationCap);
        assert_eq!(report.iterations, 1);
    }
}
