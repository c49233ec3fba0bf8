//! Input/output for the text formats the engine exchanges with its collaborators.
//!
//! Contact lists and distance files arrive as loosely formatted whitespace- or
//! colon-separated triples; finished models leave as plain per-locus coordinate
//! records, with an optional PDB rendering for visualization tools. Parsing is
//! tolerant of the comment and header lines Hi-C pipelines tend to prepend,
//! while malformed numeric rows are reported with their line number.

pub mod contacts;
pub mod coords;
pub mod pdb;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("inconsistent model: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },
}
