use crate::core::constants;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Ingest-time filtering rules for raw contact records.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Frequencies at or below this value are rejected.
    pub frequency_threshold: f64,
    /// Minimum genomic separation (in bins) a pair must span.
    pub min_separation: u32,
    /// Maximum genomic separation, unbounded when `None`.
    pub max_separation: Option<u32>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            frequency_threshold: 0.0,
            min_separation: 1,
            max_separation: None,
        }
    }
}

/// Parameters of the frequency-to-distance conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Mean target distance the converted set is rescaled to.
    pub average_distance: f64,
    /// Distance where the saturation squash begins.
    pub scale_distance: f64,
    /// Width and asymptotic headroom of the squash.
    pub wide_curve: f64,
    /// Skip the rescale and keep distances on their raw power-law scale.
    pub keep_original_scale: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            average_distance: constants::AVG_DIST,
            scale_distance: constants::SCALE_DISTANCE,
            wide_curve: constants::WIDE_CURVE,
            keep_original_scale: false,
        }
    }
}

/// Parameters of a single gradient-descent run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Initial step size; the line search adapts it from there.
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// The run converges when the gradient norm falls below this.
    pub convergence_threshold: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            learning_rate: constants::DEFAULT_LEARNING_RATE,
            max_iterations: constants::DEFAULT_MAX_ITERATIONS,
            convergence_threshold: constants::NEAR_ZERO,
        }
    }
}

/// The convert-factor grid and the restarts per candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub start: f64,
    pub end: f64,
    pub step: f64,
    pub restarts: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start: constants::START_CONVERT_FACTOR,
            end: constants::END_CONVERT_FACTOR,
            step: constants::CONVERT_FACTOR_STEP,
            restarts: constants::DEFAULT_RESTARTS,
        }
    }
}

/// Whether the convert factor is fixed by the caller or searched.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorMode {
    Fixed(f64),
    Search(SearchConfig),
}

impl Default for FactorMode {
    fn default() -> Self {
        Self::Search(SearchConfig::default())
    }
}

/// Immutable settings for one reconstruction run.
///
/// Built through [`ReconstructionConfigBuilder`], which validates everything
/// eagerly so no optimization work starts on an invalid setup. Concurrent
/// runs each hold their own copy; there is no process-wide tunable state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionConfig {
    pub filter: FilterConfig,
    pub conversion: ConversionConfig,
    pub optimizer: OptimizerConfig,
    pub factor: FactorMode,
    /// Per-chromosome locus counts for genome-wide runs.
    pub chromosome_lengths: Option<Vec<usize>>,
    /// Insert-or-raise missing adjacent intra-chromosome contacts before
    /// conversion.
    pub augment_adjacency: bool,
    /// Base seed for initial-coordinate generation; drawn from entropy when
    /// `None` and recorded in the run result either way.
    pub seed: Option<u64>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            conversion: ConversionConfig::default(),
            optimizer: OptimizerConfig::default(),
            factor: FactorMode::default(),
            chromosome_lengths: None,
            augment_adjacency: true,
            seed: None,
        }
    }
}

#[derive(Default)]
pub struct ReconstructionConfigBuilder {
    frequency_threshold: Option<f64>,
    min_separation: Option<u32>,
    max_separation: Option<u32>,
    average_distance: Option<f64>,
    scale_distance: Option<f64>,
    wide_curve: Option<f64>,
    keep_original_scale: Option<bool>,
    learning_rate: Option<f64>,
    max_iterations: Option<usize>,
    convergence_threshold: Option<f64>,
    convert_factor: Option<f64>,
    factor_start: Option<f64>,
    factor_end: Option<f64>,
    factor_step: Option<f64>,
    restarts: Option<usize>,
    chromosome_lengths: Option<Vec<usize>>,
    augment_adjacency: Option<bool>,
    seed: Option<u64>,
}

impl ReconstructionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency_threshold(mut self, threshold: f64) -> Self {
        self.frequency_threshold = Some(threshold);
        self
    }
    pub fn min_separation(mut self, bins: u32) -> Self {
        self.min_separation = Some(bins);
        self
    }
    pub fn max_separation(mut self, bins: u32) -> Self {
        self.max_separation = Some(bins);
        self
    }
    pub fn average_distance(mut self, distance: f64) -> Self {
        self.average_distance = Some(distance);
        self
    }
    pub fn scale_distance(mut self, distance: f64) -> Self {
        self.scale_distance = Some(distance);
        self
    }
    pub fn wide_curve(mut self, width: f64) -> Self {
        self.wide_curve = Some(width);
        self
    }
    pub fn keep_original_scale(mut self, keep: bool) -> Self {
        self.keep_original_scale = Some(keep);
        self
    }
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = Some(threshold);
        self
    }
    /// Fixes the convert factor, disabling the search. Takes precedence over
    /// any configured search range.
    pub fn convert_factor(mut self, factor: f64) -> Self {
        self.convert_factor = Some(factor);
        self
    }
    pub fn factor_start(mut self, start: f64) -> Self {
        self.factor_start = Some(start);
        self
    }
    pub fn factor_end(mut self, end: f64) -> Self {
        self.factor_end = Some(end);
        self
    }
    pub fn factor_step(mut self, step: f64) -> Self {
        self.factor_step = Some(step);
        self
    }
    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = Some(restarts);
        self
    }
    pub fn chromosome_lengths(mut self, lengths: Vec<usize>) -> Self {
        self.chromosome_lengths = Some(lengths);
        self
    }
    pub fn augment_adjacency(mut self, enabled: bool) -> Self {
        self.augment_adjacency = Some(enabled);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<ReconstructionConfig, ConfigError> {
        let filter = FilterConfig {
            frequency_threshold: self.frequency_threshold.unwrap_or(0.0),
            min_separation: self.min_separation.unwrap_or(1),
            max_separation: self.max_separation,
        };
        if !filter.frequency_threshold.is_finite() || filter.frequency_threshold < 0.0 {
            return Err(invalid(
                "frequency-threshold",
                format!("must be finite and non-negative, got {}", filter.frequency_threshold),
            ));
        }
        if filter.min_separation == 0 {
            return Err(invalid("min-separation", "must be at least 1 bin"));
        }
        if let Some(max) = filter.max_separation {
            if max < filter.min_separation {
                return Err(invalid(
                    "max-separation",
                    format!("{} is below min-separation {}", max, filter.min_separation),
                ));
            }
        }

        let defaults = ConversionConfig::default();
        let conversion = ConversionConfig {
            average_distance: self.average_distance.unwrap_or(defaults.average_distance),
            scale_distance: self.scale_distance.unwrap_or(defaults.scale_distance),
            wide_curve: self.wide_curve.unwrap_or(defaults.wide_curve),
            keep_original_scale: self.keep_original_scale.unwrap_or(false),
        };
        for (name, value) in [
            ("average-distance", conversion.average_distance),
            ("scale-distance", conversion.scale_distance),
            ("wide-curve", conversion.wide_curve),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(name, format!("must be finite and positive, got {value}")));
            }
        }

        let optimizer = OptimizerConfig {
            learning_rate: self
                .learning_rate
                .unwrap_or(constants::DEFAULT_LEARNING_RATE),
            max_iterations: self
                .max_iterations
                .unwrap_or(constants::DEFAULT_MAX_ITERATIONS),
            convergence_threshold: self.convergence_threshold.unwrap_or(constants::NEAR_ZERO),
        };
        if !optimizer.learning_rate.is_finite() || optimizer.learning_rate <= 0.0 {
            return Err(invalid(
                "learning-rate",
                format!("must be finite and positive, got {}", optimizer.learning_rate),
            ));
        }
        if optimizer.max_iterations == 0 {
            return Err(invalid("max-iterations", "must be at least 1"));
        }
        if !optimizer.convergence_threshold.is_finite() || optimizer.convergence_threshold <= 0.0 {
            return Err(invalid(
                "convergence-threshold",
                format!(
                    "must be finite and positive, got {}",
                    optimizer.convergence_threshold
                ),
            ));
        }

        let factor = match self.convert_factor {
            Some(fixed) => {
                if !fixed.is_finite() || fixed <= 0.0 {
                    return Err(invalid(
                        "convert-factor",
                        format!("must be finite and positive, got {fixed}"),
                    ));
                }
                FactorMode::Fixed(fixed)
            }
            None => {
                let defaults = SearchConfig::default();
                let search = SearchConfig {
                    start: self.factor_start.unwrap_or(defaults.start),
                    end: self.factor_end.unwrap_or(defaults.end),
                    step: self.factor_step.unwrap_or(defaults.step),
                    restarts: self.restarts.unwrap_or(defaults.restarts),
                };
                if !search.start.is_finite() || search.start <= 0.0 {
                    return Err(invalid(
                        "factor-start",
                        format!("must be finite and positive, got {}", search.start),
                    ));
                }
                if !search.end.is_finite() || search.end < search.start {
                    return Err(invalid(
                        "factor-end",
                        format!("{} is below factor-start {}", search.end, search.start),
                    ));
                }
                if !search.step.is_finite() || search.step <= 0.0 {
                    return Err(invalid(
                        "factor-step",
                        format!("must be finite and positive, got {}", search.step),
                    ));
                }
                if search.restarts == 0 {
                    return Err(invalid("restarts", "must be at least 1"));
                }
                FactorMode::Search(search)
            }
        };

        if let Some(lengths) = &self.chromosome_lengths {
            if lengths.is_empty() {
                return Err(invalid("chromosome-lengths", "must name at least one chromosome"));
            }
            if let Some(index) = lengths.iter().position(|&l| l == 0) {
                return Err(invalid(
                    "chromosome-lengths",
                    format!("chromosome {index} has zero length"),
                ));
            }
        }

        Ok(ReconstructionConfig {
            filter,
            conversion,
            optimizer,
            factor,
            chromosome_lengths: self.chromosome_lengths,
            augment_adjacency: self.augment_adjacency.unwrap_or(true),
            seed: self.seed,
        })
    }
}
