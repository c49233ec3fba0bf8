use crate::core::models::Model;
use crate::engine::comparison::{self, ComparisonResult};
use crate::engine::error::EngineError;
use std::fmt;
use tracing::{info, instrument};

/// Two labelled models scored for similarity.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub first: String,
    pub second: String,
    pub result: ComparisonResult,
}

/// Compares two models and labels the outcome for display.
///
/// The labels are free-form; callers usually pass file names.
#[instrument(skip_all, name = "comparison_workflow")]
pub fn run(
    first_label: &str,
    first: &Model,
    second_label: &str,
    second: &Model,
) -> Result<ComparisonOutcome, EngineError> {
    let result = comparison::compare(first, second)?;
    info!(
        correlation = result.correlation,
        rmse = result.rmse,
        "models compared"
    );
    Ok(ComparisonOutcome {
        first: first_label.to_string(),
        second: second_label.to_string(),
        result,
    })
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison of '{}' and '{}'", self.first, self.second)?;
        writeln!(f, "  loci:        {}", self.result.num_loci)?;
        writeln!(f, "  pairs:       {}", self.result.num_pairs)?;
        writeln!(f, "  correlation: {:.6}", self.result.correlation)?;
        write!(f, "  rmse:        {:.6}", self.result.rmse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn the_outcome_carries_its_labels() {
        let model = Model::seeded_random(4, 3);
        let outcome = run("a.txt", &model, "b.txt", &model).unwrap();

        assert_eq!(outcome.first, "a.txt");
        assert_eq!(outcome.second, "b.txt");
        assert_relative_eq!(outcome.result.correlation, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn display_renders_every_metric() {
        let model = Model::seeded_random(3, 8);
        let text = run("x", &model, "y", &model).unwrap().to_string();

        assert!(text.contains("Comparison of 'x' and 'y'"));
        assert!(text.contains("correlation: 1.000000"));
        assert!(text.contains("rmse:        0.000000"));
        assert!(text.contains("pairs:       3"));
    }

    #[test]
    fn size_mismatches_pass_through() {
        let a = Model::seeded_random(3, 1);
        let b = Model::seeded_random(4, 1);
        let result = run("a", &a, "b", &b);

        assert!(matches!(
            result,
            Err(EngineError::DimensionMismatch { .. })
        ));
    }
}
