use crate::core::constants;
use crate::core::models::{Constraint, Model};
use crate::engine::error::EngineError;

/// Mean variance below which a distance vector counts as constant.
const DEGENERATE_VARIANCE: f64 = 1e-12;

/// Agreement between a model and the targets it was optimized against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitScore {
    pub correlation: f64,
    pub rmse: f64,
}

/// Similarity of two models over the same loci.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonResult {
    pub correlation: f64,
    pub rmse: f64,
    pub num_loci: usize,
    pub num_pairs: usize,
}

/// Compares two models through their pairwise distance matrices.
///
/// Both distance vectors are normalized by their own mean first, so models
/// that differ only by a rigid motion or a uniform scale compare as
/// identical. Normalizing both sides also keeps the result symmetric in its
/// arguments.
pub fn compare(a: &Model, b: &Model) -> Result<ComparisonResult, EngineError> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.len() < 2 {
        return Err(EngineError::TooFewLoci {
            minimum: 2,
            found: a.len(),
        });
    }

    let distances_a = mean_normalized(pairwise_distances(a));
    let distances_b = mean_normalized(pairwise_distances(b));
    Ok(ComparisonResult {
        correlation: pearson(&distances_a, &distances_b),
        rmse: rmse(&distances_a, &distances_b),
        num_loci: a.len(),
        num_pairs: distances_a.len(),
    })
}

/// Scores a model against its constraints' target distances.
///
/// Distances are read off the model, so the score does not depend on any
/// state a previous optimization run left behind.
pub fn fit(model: &Model, constraints: &[Constraint]) -> FitScore {
    if constraints.is_empty() {
        return FitScore {
            correlation: 0.0,
            rmse: 0.0,
        };
    }
    let structural: Vec<f64> = constraints
        .iter()
        .map(|c| {
            let (a, b) = c.pair();
            model.distance(a as usize, b as usize)
        })
        .collect();
    let targets: Vec<f64> = constraints.iter().map(|c| c.target_distance).collect();
    FitScore {
        correlation: pearson(&structural, &targets),
        rmse: rmse(&structural, &targets),
    }
}

/// Upper-triangle pairwise distances in `(i, j)` order with `i < j`.
fn pairwise_distances(model: &Model) -> Vec<f64> {
    let n = model.len();
    let mut distances = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            distances.push(model.distance(i, j));
        }
    }
    distances
}

fn mean_normalized(mut distances: Vec<f64>) -> Vec<f64> {
    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    if mean > 0.0 {
        for distance in &mut distances {
            *distance /= mean;
        }
    }
    distances
}

/// Pearson correlation with a defined answer for constant vectors: one when
/// the vectors agree within tolerance, zero otherwise.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    if variance_a / n < DEGENERATE_VARIANCE || variance_b / n < DEGENERATE_VARIANCE {
        let equal = a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= constants::NEAR_ZERO);
        return if equal { 1.0 } else { 0.0 };
    }
    covariance / (variance_a.sqrt() * variance_b.sqrt())
}

fn rmse(a: &[f64], b: &[f64]) -> f64 {
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum / a.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn line_model(xs: &[f64]) -> Model {
        Model::from_coordinates(xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect())
    }

    #[test]
    fn a_model_compared_with_itself_is_perfect() {
        let model = Model::seeded_random(6, 42);
        let result = compare(&model, &model).unwrap();

        assert_relative_eq!(result.correlation, 1.0, epsilon = 1e-12);
        assert_eq!(result.rmse, 0.0);
        assert_eq!(result.num_loci, 6);
        assert_eq!(result.num_pairs, 15);
    }

    #[test]
    fn comparison_is_symmetric() {
        let a = Model::seeded_random(5, 1);
        let b = Model::seeded_random(5, 2);

        let forward = compare(&a, &b).unwrap();
        let backward = compare(&b, &a).unwrap();
        assert_relative_eq!(forward.correlation, backward.correlation, epsilon = 1e-12);
        assert_relative_eq!(forward.rmse, backward.rmse, epsilon = 1e-12);
    }

    #[test]
    fn uniform_scaling_does_not_change_the_comparison() {
        let a = Model::seeded_random(5, 9);
        let scaled = Model::from_coordinates(
            a.coordinates()
                .iter()
                .map(|p| Point3::from(p.coords * 3.0))
                .collect(),
        );

        let result = compare(&a, &scaled).unwrap();
        assert_relative_eq!(result.correlation, 1.0, epsilon = 1e-9);
        assert!(result.rmse < 1e-9);
    }

    #[test]
    fn mismatched_sizes_are_an_error() {
        let a = Model::seeded_random(4, 1);
        let b = Model::seeded_random(5, 1);

        assert!(matches!(
            compare(&a, &b),
            Err(EngineError::DimensionMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn a_single_locus_cannot_be_compared() {
        let a = Model::seeded_random(1, 1);
        let b = Model::seeded_random(1, 2);

        assert!(matches!(
            compare(&a, &b),
            Err(EngineError::TooFewLoci { minimum: 2, found: 1 })
        ));
    }

    #[test]
    fn correlation_matches_a_hand_computed_value() {
        // Distances (1, 3, 2) against (1, 4, 3): r = sqrt(27/28).
        let a = line_model(&[0.0, 1.0, 3.0]);
        let b = line_model(&[0.0, 1.0, 4.0]);

        let result = compare(&a, &b).unwrap();
        assert_relative_eq!(
            result.correlation,
            (27.0f64 / 28.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn fit_is_perfect_when_targets_equal_the_distances() {
        let model = line_model(&[0.0, 1.0, 3.0]);
        let constraints = vec![
            Constraint::with_target(0, 1, 1.0, 1.0),
            Constraint::with_target(0, 2, 1.0, 3.0),
            Constraint::with_target(1, 2, 1.0, 2.0),
        ];

        let score = fit(&model, &constraints);
        assert_relative_eq!(score.correlation, 1.0, epsilon = 1e-12);
        assert_relative_eq!(score.rmse, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_distance_vectors_fall_back_to_the_equality_rule() {
        // Equilateral triangles have zero variance across their distances.
        let side = Model::from_coordinates(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 3.0f64.sqrt() / 2.0, 0.0),
        ]);
        let result = compare(&side, &side).unwrap();
        assert_eq!(result.correlation, 1.0);
    }
}
