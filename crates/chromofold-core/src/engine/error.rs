use crate::core::models::ZeroLengthChromosome;
use crate::engine::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no usable constraints: all {records} input records were rejected or empty")]
    EmptyConstraintSet { records: usize },

    #[error("model has {actual} loci, but the run needs {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("locus {locus} lies outside the configured {total} loci")]
    LocusOutOfRange { locus: u32, total: usize },

    #[error("invalid target distance {value} for pair ({pos1}, {pos2})")]
    InvalidTargetDistance { pos1: u32, pos2: u32, value: f64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chromosome(#[from] ZeroLengthChromosome),

    #[error("all {runs} optimization runs failed with non-finite values")]
    AllRunsFailed { runs: usize },

    #[error("comparison requires at least {minimum} loci, found {found}")]
    TooFewLoci { minimum: usize, found: usize },

    #[error("operation cancelled")]
    Cancelled,
}
