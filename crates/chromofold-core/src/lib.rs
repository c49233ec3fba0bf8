//! # chromofold Core Library
//!
//! A library for reconstructing three-dimensional chromosome and genome
//! models from chromatin interaction frequencies (e.g. Hi-C contact lists)
//! through constraint-driven gradient optimization.
//!
//! ## Architecture
//!
//! The crate is split into three layers with one-directional dependencies,
//! which keeps the numerical machinery testable in isolation.
//!
//! - **[`core`]** holds the stateless building blocks: the coordinate model,
//!   pairwise constraints, chromosome span bookkeeping, the method's
//!   numerical constants, and readers and writers for the supported text
//!   formats.
//!
//! - **[`engine`]** implements the reconstruction machinery on top of those
//!   blocks: the constraint store, frequency-to-distance conversion, the
//!   gradient-descent optimizer, the convert-factor search, and the
//!   distance-matrix comparator, along with configuration, progress, and
//!   cancellation plumbing.
//!
//! - **[`workflows`]** is the user-facing layer. Each workflow wires the
//!   engine pieces into one complete procedure, such as reconstructing a
//!   model from a contact list or comparing two finished models, and is what
//!   binaries and library consumers are expected to call.

pub mod core;
pub mod engine;
pub mod workflows;
