use crate::core::io::contacts::DistanceRecord;
use crate::core::models::Constraint;
use crate::engine::config::ConversionConfig;
use crate::engine::error::EngineError;
use std::collections::BTreeMap;
use tracing::trace;

/// Derives every target distance from its interaction frequency.
///
/// Raw distances follow the inverse power law `f^(-convert_factor)`, are
/// rescaled so their mean matches `config.average_distance` (unless the raw
/// scale is kept), and finally run through the saturation squash so extreme
/// pairs cannot dominate the objective.
pub fn assign_target_distances(
    constraints: &mut [Constraint],
    convert_factor: f64,
    config: &ConversionConfig,
) {
    if constraints.is_empty() {
        return;
    }
    for constraint in constraints.iter_mut() {
        constraint.target_distance = constraint.frequency.powf(-convert_factor);
    }
    if !config.keep_original_scale {
        rescale_to_mean(constraints, config.average_distance);
    }
    for constraint in constraints.iter_mut() {
        constraint.target_distance = squash(constraint.target_distance, config);
    }
}

/// Multiplies all targets by one common factor so their mean becomes `mean`.
///
/// A pure rescale preserves ratios between targets and is idempotent.
pub(crate) fn rescale_to_mean(constraints: &mut [Constraint], mean: f64) {
    let current =
        constraints.iter().map(|c| c.target_distance).sum::<f64>() / constraints.len() as f64;
    let scale = mean / current;
    trace!(current_mean = current, scale, "rescaling target distances");
    for constraint in constraints.iter_mut() {
        constraint.target_distance *= scale;
    }
}

/// Compresses distances beyond `scale_distance` onto a bounded tail.
///
/// Below the threshold the map is the identity; above it the excess passes
/// through `tanh`, which keeps the map continuous with slope one at the
/// threshold, strictly increasing, and bounded by
/// `scale_distance + wide_curve`.
pub(crate) fn squash(distance: f64, config: &ConversionConfig) -> f64 {
    if distance <= config.scale_distance {
        distance
    } else {
        let excess = (distance - config.scale_distance) / config.wide_curve;
        config.scale_distance + config.wide_curve * excess.tanh()
    }
}

/// Builds constraints straight from measured distances, skipping conversion.
///
/// Pairs are canonicalized and deduplicated the way frequency ingestion does
/// it; frequencies default to one so every constraint carries equal weight.
pub fn constraints_from_distances(
    records: &[DistanceRecord],
) -> Result<Vec<Constraint>, EngineError> {
    let mut map = BTreeMap::new();
    for record in records {
        let (lo, hi) = if record.pos1 <= record.pos2 {
            (record.pos1, record.pos2)
        } else {
            (record.pos2, record.pos1)
        };
        if lo == hi {
            continue;
        }
        if !record.distance.is_finite() || record.distance <= 0.0 {
            return Err(EngineError::InvalidTargetDistance {
                pos1: record.pos1,
                pos2: record.pos2,
                value: record.distance,
            });
        }
        map.insert((lo, hi), record.distance);
    }
    Ok(map
        .into_iter()
        .map(|((lo, hi), distance)| Constraint::with_target(lo, hi, 1.0, distance))
        .collect())
}
