//! # Engine Module
//!
//! This module implements the reconstruction engine: everything between a raw
//! contact list and a scored 3D model.
//!
//! ## Overview
//!
//! The engine owns the stateful machinery of a reconstruction run. It ingests
//! contact records into a canonical constraint store, converts interaction
//! frequencies into target distances, drives the gradient-descent structure
//! optimizer, searches the convert-factor grid, and scores candidate models
//! against their targets or against each other.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Immutable, eagerly validated run settings
//! - **Constraint Store** ([`constraints`]) - Canonical pair set with ingest
//!   filtering, statistics, and adjacency augmentation
//! - **Distance Conversion** ([`conversion`]) - The frequency-to-distance
//!   power law, saturation squash, and canonical rescale
//! - **Structure Optimizer** ([`optimizer`]) - The iterative solver with its
//!   line search, convergence tests, and terminal-state machine
//! - **Convert-Factor Search** ([`search`]) - The parallel grid-and-restarts
//!   driver selecting the best-fitting factor
//! - **Model Comparison** ([`comparison`]) - Distance-matrix correlation and
//!   RMSE scoring
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Cancellation** ([`task`]) - Cooperative cancellation tokens
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Parallelism follows the crate's `parallel` feature: the search fans
//! `(factor, restart)` runs across the thread pool, and each optimizer
//! iteration reduces its gradient over constraint chunks, both on the same
//! pool so nested use cannot oversubscribe.

pub mod comparison;
pub mod config;
pub mod constraints;
pub mod conversion;
pub mod error;
pub mod optimizer;
pub mod progress;
pub mod search;
pub mod task;
