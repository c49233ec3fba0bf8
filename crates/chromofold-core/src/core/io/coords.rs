use super::{ParseErrorKind, TextFileError};
use crate::core::models::{ChromosomeSpans, Model};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes the canonical per-locus `index x y z` record sequence.
pub fn write_model(model: &Model, writer: &mut impl Write) -> Result<(), TextFileError> {
    writeln!(writer, "# locus\tx\ty\tz")?;
    for (locus, point) in model.coordinates().iter().enumerate() {
        writeln!(
            writer,
            "{}\t{:.6}\t{:.6}\t{:.6}",
            locus, point.x, point.y, point.z
        )?;
    }
    Ok(())
}

pub fn write_model_to_path(model: &Model, path: &Path) -> Result<(), TextFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_model(model, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Reads a model back from the `index x y z` format.
///
/// Rows may appear in any order; the locus indices must form the dense range
/// `0..n` with no gaps or duplicates.
pub fn read_model(reader: &mut impl BufRead) -> Result<Model, TextFileError> {
    let mut rows: Vec<(u32, Point3<f64>)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let row = line.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = row.split_whitespace().collect();
        if tokens
            .first()
            .is_none_or(|token| token.parse::<f64>().is_err())
        {
            continue;
        }
        if tokens.len() < 4 {
            return Err(TextFileError::Parse {
                line: idx + 1,
                kind: ParseErrorKind::FieldCount {
                    expected: 4,
                    found: tokens.len(),
                },
            });
        }

        let locus = tokens[0].parse::<u32>().map_err(|_| TextFileError::Parse {
            line: idx + 1,
            kind: ParseErrorKind::InvalidNumber {
                field: "locus",
                value: tokens[0].to_string(),
            },
        })?;
        let mut xyz = [0.0f64; 3];
        for (slot, token) in xyz.iter_mut().zip(&tokens[1..4]) {
            *slot = token.parse::<f64>().map_err(|_| TextFileError::Parse {
                line: idx + 1,
                kind: ParseErrorKind::InvalidNumber {
                    field: "coordinate",
                    value: token.to_string(),
                },
            })?;
        }
        rows.push((locus, Point3::new(xyz[0], xyz[1], xyz[2])));
    }

    rows.sort_by_key(|(locus, _)| *locus);
    for (expected, (locus, _)) in rows.iter().enumerate() {
        if *locus as usize != expected {
            return Err(TextFileError::Inconsistency(format!(
                "locus indices are not dense: expected {expected}, found {locus}"
            )));
        }
    }

    Ok(Model::from_coordinates(
        rows.into_iter().map(|(_, point)| point).collect(),
    ))
}

pub fn read_model_from_path(path: &Path) -> Result<Model, TextFileError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_model(&mut reader)
}

/// Writes the locus-to-chromosome mapping for a genome-wide model.
pub fn write_mapping(spans: &ChromosomeSpans, writer: &mut impl Write) -> Result<(), TextFileError> {
    writeln!(writer, "# locus\tchromosome\tbin")?;
    for (chromosome, span) in spans.spans().enumerate() {
        for (bin, locus) in span.enumerate() {
            writeln!(writer, "{}\t{}\t{}", locus, chromosome + 1, bin)?;
        }
    }
    Ok(())
}

pub fn write_mapping_to_path(spans: &ChromosomeSpans, path: &Path) -> Result<(), TextFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_mapping(spans, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn chain_model() -> Model {
        Model::from_coordinates(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, -2.25, 3.0),
            Point3::new(4.0, 4.0, 4.0),
        ])
    }

    #[test]
    fn model_round_trips_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.txt");

        let model = chain_model();
        write_model_to_path(&model, &path).unwrap();
        let restored = read_model_from_path(&path).unwrap();

        assert_eq!(restored.len(), model.len());
        for locus in 0..model.len() {
            assert_relative_eq!(
                (restored.point(locus) - model.point(locus)).norm(),
                0.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn rows_may_arrive_out_of_order() {
        let input = "2 4.0 4.0 4.0\n0 0.0 0.0 0.0\n1 1.0 1.0 1.0\n";
        let model = read_model(&mut Cursor::new(input)).unwrap();

        assert_eq!(model.len(), 3);
        assert_relative_eq!(model.point(2).x, 4.0);
    }

    #[test]
    fn gaps_in_locus_indices_are_rejected() {
        let input = "0 0.0 0.0 0.0\n2 1.0 1.0 1.0\n";
        let err = read_model(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(err, TextFileError::Inconsistency(_)));
    }

    #[test]
    fn duplicate_locus_indices_are_rejected() {
        let input = "0 0.0 0.0 0.0\n0 1.0 1.0 1.0\n";
        let err = read_model(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(err, TextFileError::Inconsistency(_)));
    }

    #[test]
    fn mapping_lists_every_locus_with_its_chromosome() {
        let spans = ChromosomeSpans::from_lengths(&[2, 1]).unwrap();
        let mut buffer = Vec::new();
        write_mapping(&spans, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "0\t1\t0");
        assert_eq!(lines[2], "1\t1\t1");
        assert_eq!(lines[3], "2\t2\t0");
    }
}
