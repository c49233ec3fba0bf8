//! # Workflows Module
//!
//! High-level entry points that assemble the engine pieces into complete
//! procedures. Binaries and library consumers are expected to call these
//! rather than drive the engine directly.
//!
//! ## Available Workflows
//!
//! - **Reconstruction** ([`reconstruct`]) - Builds a 3D model from a contact
//!   list or a target-distance list: ingestion and filtering, optional
//!   adjacency augmentation, frequency-to-distance conversion, the
//!   convert-factor search (or a single fixed-factor run), and final fit
//!   scoring.
//!
//! - **Comparison** ([`compare`]) - Scores the similarity of two finished
//!   models through their pairwise distance matrices.
//!
//! Both workflows take a [`ProgressReporter`](crate::engine::progress::ProgressReporter)
//! for UI feedback and a [`CancellationToken`](crate::engine::task::CancellationToken)
//! that stops the work between iterations.

pub mod compare;
pub mod reconstruct;
