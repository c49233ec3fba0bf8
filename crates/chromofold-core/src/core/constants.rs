//! Numerical constants of the reconstruction method.
//!
//! These are the fixed parameters of the frequency-to-distance model and the
//! defaults for the tunable optimizer settings. Tunables are never read from
//! global mutable state; they seed the immutable configuration objects in
//! [`crate::engine::config`].

/// Canonical mean target distance the converted constraint set is rescaled to.
pub const AVG_DIST: f64 = 10.0;

/// Target distance above which the squashing transform starts to compress.
pub const SCALE_DISTANCE: f64 = 15.0;

/// Width of the saturation curve; also its asymptotic headroom above
/// [`SCALE_DISTANCE`].
pub const WIDE_CURVE: f64 = 25.0;

/// Numerical floor used for the gradient-norm convergence test and the
/// line-search step underflow check.
pub const NEAR_ZERO: f64 = 1e-5;

/// First candidate convert factor of the default search grid.
pub const START_CONVERT_FACTOR: f64 = 0.1;

/// Last candidate convert factor of the default search grid.
pub const END_CONVERT_FACTOR: f64 = 3.0;

/// Spacing of the default convert-factor grid.
pub const CONVERT_FACTOR_STEP: f64 = 0.1;

/// Random restarts per candidate convert factor.
pub const DEFAULT_RESTARTS: usize = 5;

pub const DEFAULT_LEARNING_RATE: f64 = 1.0;

pub const DEFAULT_MAX_ITERATIONS: usize = 2000;

/// Upper bound on worker threads a front end may configure.
pub const MAX_NUM_THREADS: usize = 120;
