use super::TextFileError;
use crate::core::models::{ChromosomeSpans, Model};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CHAIN_IDS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Renders a model as a PDB pseudo-structure for visualization tools.
///
/// Each locus becomes one CA pseudo-atom; each chromosome span becomes one
/// chain, with CONECT records linking consecutive loci of the same
/// chromosome. Serial and residue numbers wrap at the PDB column widths,
/// which visualizers accept for pseudo-structures of this kind.
pub fn write_pdb(
    model: &Model,
    spans: &ChromosomeSpans,
    writer: &mut impl Write,
) -> Result<(), TextFileError> {
    writeln!(writer, "REMARK   GENOME MODEL GENERATED BY CHROMOFOLD")?;

    for (chromosome, span) in spans.spans().enumerate() {
        let chain = CHAIN_IDS[chromosome % CHAIN_IDS.len()] as char;
        for (bin, locus) in span.clone().enumerate() {
            if locus >= model.len() {
                break;
            }
            let point = model.point(locus);
            writeln!(
                writer,
                "ATOM  {:>5}  CA  UNK {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}",
                (locus + 1) % 100_000,
                chain,
                (bin % 9999) + 1,
                point.x,
                point.y,
                point.z,
                1.00,
                0.00
            )?;
        }
        for locus in span.start..span.end.saturating_sub(1) {
            if locus + 1 >= model.len() {
                break;
            }
            writeln!(
                writer,
                "CONECT{:>5}{:>5}",
                (locus + 1) % 100_000,
                (locus + 2) % 100_000
            )?;
        }
    }

    writeln!(writer, "END")?;
    Ok(())
}

pub fn write_pdb_to_path(
    model: &Model,
    spans: &ChromosomeSpans,
    path: &Path,
) -> Result<(), TextFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pdb(model, spans, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn render(model: &Model, spans: &ChromosomeSpans) -> String {
        let mut buffer = Vec::new();
        write_pdb(model, spans, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn one_atom_per_locus_and_one_chain_per_chromosome() {
        let model = Model::from_coordinates(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ]);
        let spans = ChromosomeSpans::from_lengths(&[2, 2]).unwrap();

        let text = render(&model, &spans);
        let atoms: Vec<&str> = text.lines().filter(|l| l.starts_with("ATOM")).collect();
        assert_eq!(atoms.len(), 4);
        assert!(atoms[0].contains(" A "));
        assert!(atoms[2].contains(" B "));
        assert!(text.ends_with("END\n"));
    }

    #[test]
    fn conect_records_do_not_bridge_chromosomes() {
        let model = Model::from_coordinates(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ]);
        let spans = ChromosomeSpans::from_lengths(&[2, 2]).unwrap();

        let text = render(&model, &spans);
        let conects: Vec<&str> = text.lines().filter(|l| l.starts_with("CONECT")).collect();
        assert_eq!(conects.len(), 2);
        assert_eq!(conects[0], "CONECT    1    2");
        assert_eq!(conects[1], "CONECT    3    4");
    }

    #[test]
    fn coordinates_land_in_fixed_columns() {
        let model = Model::from_coordinates(vec![Point3::new(12.345, -6.789, 101.5)]);
        let spans = ChromosomeSpans::single(1);

        let text = render(&model, &spans);
        let atom = text.lines().find(|l| l.starts_with("ATOM")).unwrap();
        assert_eq!(&atom[30..38], "  12.345");
        assert_eq!(&atom[38..46], "  -6.789");
        assert_eq!(&atom[46..54], " 101.500");
    }
}
