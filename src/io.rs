//! Readers for shape models and per-face data tables.
//!
//! All readers report malformed input as [`MapError::Parse`] with the
//! 1-based line number.

use std::path::Path;

use crate::error::{MapError, Result};
use crate::geometry::{AngleUnit, Mesh, SphericalSample};

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| MapError::io(path, e))
}

fn parse_f64(path: &Path, line: usize, field: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| MapError::parse(path, line, format!("expected a number, got '{}'", field.trim())))
}

/// Vertex reference of an OBJ `f` record: `v`, `v/vt`, `v//vn` or `v/vt/vn`.
/// Negative indices count back from the last vertex read so far.
fn parse_obj_index(path: &Path, line: usize, token: &str, nverts: usize) -> Result<usize> {
    let head = token.split('/').next().unwrap_or_default();
    let idx: i64 = head
        .parse()
        .map_err(|_| MapError::parse(path, line, format!("bad face index '{token}'")))?;
    let resolved = match idx {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => nverts.checked_sub(i.unsigned_abs() as usize),
    };
    resolved.ok_or_else(|| MapError::parse(path, line, format!("face index '{token}' out of range")))
}

/// Wavefront OBJ `v` and `f` records. Polygons are fan-triangulated; other
/// record types are ignored.
pub fn read_obj(path: &Path) -> Result<Mesh> {
    let text = read_text(path)?;
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let lineno = n + 1;
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 3 {
                    return Err(MapError::parse(path, lineno, "vertex needs 3 coordinates"));
                }
                vertices.push([
                    parse_f64(path, lineno, coords[0])?,
                    parse_f64(path, lineno, coords[1])?,
                    parse_f64(path, lineno, coords[2])?,
                ]);
            }
            Some("f") => {
                let idx = parts
                    .map(|t| parse_obj_index(path, lineno, t, vertices.len()))
                    .collect::<Result<Vec<_>>>()?;
                if idx.len() < 3 {
                    return Err(MapError::parse(path, lineno, "face needs at least 3 vertices"));
                }
                for k in 1..idx.len() - 1 {
                    faces.push([idx[0], idx[k], idx[k + 1]]);
                }
            }
            _ => {}
        }
    }
    Mesh::new(vertices, faces)
}

fn data_rows(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(n, l)| (n + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

/// Face table with a header row and the columns `x,y,z,lon,lat,rad`, one row
/// per face. Longitudes are wrapped into [-180, 180].
pub fn read_face_table(path: &Path, unit: AngleUnit) -> Result<Vec<SphericalSample>> {
    let text = read_text(path)?;
    let scale = unit.to_degrees();
    data_rows(&text)
        .skip(1)
        .map(|(lineno, row)| {
            let fields: Vec<&str> = row.split(',').collect();
            if fields.len() != 6 {
                return Err(MapError::parse(
                    path,
                    lineno,
                    format!("expected 6 columns (x,y,z,lon,lat,rad), got {}", fields.len()),
                ));
            }
            let mut lon = parse_f64(path, lineno, fields[3])? * scale;
            if lon > 180.0 {
                lon -= 360.0;
            }
            Ok(SphericalSample {
                lon,
                lat: parse_f64(path, lineno, fields[4])? * scale,
                radius: parse_f64(path, lineno, fields[5])?,
            })
        })
        .collect()
}

/// One named column of a comma-separated file with a header row.
pub fn read_column(path: &Path, name: &str) -> Result<Vec<f64>> {
    let text = read_text(path)?;
    let mut rows = data_rows(&text);
    let (_, header) = rows
        .next()
        .ok_or_else(|| MapError::parse(path, 1, "empty file, expected a header row"))?;
    let col = header
        .split(',')
        .position(|h| h.trim() == name)
        .ok_or_else(|| MapError::parse(path, 1, format!("no column named '{name}'")))?;
    rows.map(|(lineno, row)| {
        let field = row
            .split(',')
            .nth(col)
            .ok_or_else(|| MapError::parse(path, lineno, format!("row has no column {}", col + 1)))?;
        parse_f64(path, lineno, field)
    })
    .collect()
}
