use super::{ParseErrorKind, TextFileError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// One raw `(locus, locus, frequency)` row, exactly as read.
///
/// No canonicalization or filtering happens here; that is the constraint
/// store's job, so rejected rows can be counted per reason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub pos1: u32,
    pub pos2: u32,
    pub frequency: f64,
}

/// One `(locus, locus, distance)` row from an externally supplied
/// target-distance file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceRecord {
    pub pos1: u32,
    pub pos2: u32,
    pub distance: f64,
}

pub fn read_contacts(reader: &mut impl BufRead) -> Result<Vec<ContactRecord>, TextFileError> {
    read_triples(reader).map(|triples| {
        triples
            .into_iter()
            .map(|(pos1, pos2, frequency)| ContactRecord {
                pos1,
                pos2,
                frequency,
            })
            .collect()
    })
}

pub fn read_contacts_from_path(path: &Path) -> Result<Vec<ContactRecord>, TextFileError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_contacts(&mut reader)
}

pub fn read_distances(reader: &mut impl BufRead) -> Result<Vec<DistanceRecord>, TextFileError> {
    read_triples(reader).map(|triples| {
        triples
            .into_iter()
            .map(|(pos1, pos2, distance)| DistanceRecord {
                pos1,
                pos2,
                distance,
            })
            .collect()
    })
}

pub fn read_distances_from_path(path: &Path) -> Result<Vec<DistanceRecord>, TextFileError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_distances(&mut reader)
}

/// Splits a row on any run of whitespace or `:` separators.
fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ':')
        .filter(|token| !token.is_empty())
}

fn read_triples(reader: &mut impl BufRead) -> Result<Vec<(u32, u32, f64)>, TextFileError> {
    let mut triples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let row = line.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = fields(row).collect();
        // A non-numeric leading token marks a column-header line.
        if tokens
            .first()
            .is_none_or(|token| token.parse::<f64>().is_err())
        {
            debug!(line = idx + 1, "skipping header line");
            continue;
        }
        if tokens.len() < 3 {
            return Err(TextFileError::Parse {
                line: idx + 1,
                kind: ParseErrorKind::FieldCount {
                    expected: 3,
                    found: tokens.len(),
                },
            });
        }

        let pos1 = parse_locus(tokens[0], idx + 1)?;
        let pos2 = parse_locus(tokens[1], idx + 1)?;
        let value = tokens[2]
            .parse::<f64>()
            .map_err(|_| TextFileError::Parse {
                line: idx + 1,
                kind: ParseErrorKind::InvalidNumber {
                    field: "value",
                    value: tokens[2].to_string(),
                },
            })?;

        triples.push((pos1, pos2, value));
    }

    Ok(triples)
}

fn parse_locus(token: &str, line: usize) -> Result<u32, TextFileError> {
    token.parse::<u32>().map_err(|_| TextFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidNumber {
            field: "locus",
            value: token.to_string(),
        },
    })
}
