//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent a genome
//! reconstruction problem: the pairwise interaction constraints, the evolving 3D
//! model, and the partition of loci into chromosomes.
//!
//! ## Key Components
//!
//! - [`constraint`] - A canonical locus pair with its interaction frequency and the
//!   target/structural distances attached to it during a run
//! - [`structure`] - The ordered sequence of 3D coordinates forming one model
//! - [`chromosome`] - Locus-index spans derived from per-chromosome lengths
//!
//! The models are deliberately plain: all reconstruction behavior lives in
//! [`crate::engine`], which owns and mutates these values for the duration of a run.

pub mod chromosome;
pub mod constraint;
pub mod structure;

pub use chromosome::{ChromosomeSpans, ZeroLengthChromosome};
pub use constraint::Constraint;
pub use structure::Model;
