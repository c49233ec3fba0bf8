//! # Core Module
//!
//! This module provides the fundamental building blocks for chromosome structure
//! reconstruction in chromofold, serving as the data foundation of the library.
//!
//! ## Overview
//!
//! The core module implements the essential data structures and utilities required
//! to represent a genome as a chain of loci in 3D space, to describe the pairwise
//! interaction constraints between those loci, and to exchange both with the outside
//! world through simple text formats.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **Data Models** ([`models`]) - Constraints, 3D models, and chromosome span bookkeeping
//! - **Method Constants** ([`constants`]) - The numerical constants of the reconstruction method
//! - **File I/O** ([`io`]) - Contact lists, coordinate files, and export formats
//!
//! ## Key Capabilities
//!
//! - **Canonical constraint representation** with pair-symmetric ordering
//! - **Mutable 3D models** with cheap snapshots for scoring and export
//! - **Genome partitioning** into per-chromosome locus spans
//! - **Tolerant text parsing** for the loosely-specified contact-list formats
//!   produced by Hi-C processing pipelines

pub mod constants;
pub mod io;
pub mod models;
