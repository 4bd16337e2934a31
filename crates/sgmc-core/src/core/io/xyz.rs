use super::IoError;
use crate::core::models::atom::Atom;
use crate::core::models::slab::{Cell, Slab};
use nalgebra::{Point3, Vector3};
use std::io::{BufRead, Write};

/// Writes a slab as one XYZ frame.
///
/// The comment line carries the orthorhombic cell and periodicity flags so a
/// round trip through [`read_xyz`] reconstructs the full structure.
pub fn write_xyz<W: Write>(writer: &mut W, slab: &Slab) -> Result<(), IoError> {
    let cell = slab.cell();
    writeln!(writer, "{}", slab.len())?;
    writeln!(
        writer,
        "cell={:.8},{:.8},{:.8} pbc={},{},{}",
        cell.lengths.x,
        cell.lengths.y,
        cell.lengths.z,
        cell.periodic[0] as u8,
        cell.periodic[1] as u8,
        cell.periodic[2] as u8,
    )?;
    for atom in slab.atoms_iter() {
        writeln!(
            writer,
            "{} {:.8} {:.8} {:.8}",
            atom.species, atom.position.x, atom.position.y, atom.position.z
        )?;
    }
    Ok(())
}

/// Reads a single XYZ frame written by [`write_xyz`].
pub fn read_xyz<R: BufRead>(reader: R) -> Result<Slab, IoError> {
    let mut lines = reader.lines().enumerate();

    let (_, count_line) = lines.next().ok_or(IoError::MalformedXyz {
        line: 1,
        message: "empty input".to_string(),
    })?;
    let count: usize = count_line?.trim().parse().map_err(|_| IoError::MalformedXyz {
        line: 1,
        message: "expected atom count".to_string(),
    })?;

    let (_, comment_line) = lines.next().ok_or(IoError::MalformedXyz {
        line: 2,
        message: "missing comment line".to_string(),
    })?;
    let cell = parse_cell(&comment_line?).ok_or(IoError::MalformedXyz {
        line: 2,
        message: "missing or malformed cell specification".to_string(),
    })?;

    let mut atoms = Vec::with_capacity(count);
    for _ in 0..count {
        let (index, line) = lines.next().ok_or(IoError::MalformedXyz {
            line: count + 2,
            message: format!("expected {count} atom records"),
        })?;
        let line = line?;
        let mut fields = line.split_whitespace();
        let parse = |field: Option<&str>| -> Option<f64> { field?.parse().ok() };
        let species = fields.next();
        let (x, y, z) = (
            parse(fields.next()),
            parse(fields.next()),
            parse(fields.next()),
        );
        match (species, x, y, z) {
            (Some(species), Some(x), Some(y), Some(z)) => {
                atoms.push(Atom::new(species, Point3::new(x, y, z)));
            }
            _ => {
                return Err(IoError::MalformedXyz {
                    line: index + 1,
                    message: "expected `species x y z`".to_string(),
                });
            }
        }
    }

    Ok(Slab::new(atoms, cell))
}

fn parse_cell(comment: &str) -> Option<Cell> {
    let mut lengths = None;
    let mut periodic = None;
    for token in comment.split_whitespace() {
        if let Some(value) = token.strip_prefix("cell=") {
            let parts: Vec<f64> = value.split(',').filter_map(|v| v.parse().ok()).collect();
            if parts.len() == 3 {
                lengths = Some(Vector3::new(parts[0], parts[1], parts[2]));
            }
        } else if let Some(value) = token.strip_prefix("pbc=") {
            let parts: Vec<bool> = value.split(',').map(|v| v == "1").collect();
            if parts.len() == 3 {
                periodic = Some([parts[0], parts[1], parts[2]]);
            }
        }
    }
    Some(Cell {
        lengths: lengths?,
        periodic: periodic?,
    })
}
