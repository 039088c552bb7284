// Columnar text export of plotted series.

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::error::{MapError, Result};
use crate::output;
use crate::series::Series;

/// Default header: `x0,y0[,z0],x1,y1[,z1],...`.
pub fn default_names(series: &[Series]) -> Vec<String> {
    series
        .iter()
        .enumerate()
        .flat_map(|(k, s)| {
            let mut names = vec![format!("x{k}"), format!("y{k}")];
            if s.z.is_some() {
                names.push(format!("z{k}"));
            }
            names
        })
        .collect()
}

/// Format the table: header row, then one record per shared index.
pub fn format_table(series: &[Series], names: Option<&[String]>) -> Result<String> {
    let Some(rows) = series.first().map(Series::len) else {
        return Err(MapError::config("table needs at least one series"));
    };
    for (k, s) in series.iter().enumerate() {
        s.validate()?;
        if s.len() != rows {
            return Err(MapError::config(format!(
                "series {k} has {} rows but series 0 has {rows}",
                s.len()
            )));
        }
    }
    let columns: usize = series.iter().map(Series::columns).sum();
    let header = match names {
        Some(names) if names.len() != columns => {
            return Err(MapError::config(format!(
                "{} column names given for {columns} columns",
                names.len()
            )));
        }
        Some(names) => names.to_vec(),
        None => default_names(series),
    };

    let mut out = header.join(",");
    out.push('\n');
    for i in 0..rows {
        let mut first = true;
        for s in series {
            let z = s.z.as_ref().map(|z| z[i]);
            for v in [Some(s.x[i]), Some(s.y[i]), z].into_iter().flatten() {
                if !first {
                    out.push(',');
                }
                first = false;
                let _ = write!(out, "{v}");
            }
        }
        out.push('\n');
    }
    Ok(out)
}

/// Write the table to `path`, creating its directory. Nothing is written if
/// the series are inconsistent.
pub fn write_table(series: &[Series], names: Option<&[String]>, path: &Path) -> Result<()> {
    let text = format_table(series, names)?;
    save_text(&text, path)
}

/// Write an already formatted table, creating its directory.
pub fn save_text(text: &str, path: &Path) -> Result<()> {
    output::write_together(&[(path, text.as_bytes())])?;
    info!(path = %path.display(), rows = text.lines().count().saturating_sub(1), "wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, offset: f64) -> Series {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y = x.iter().map(|v| v + offset).collect();
        let z = x.iter().map(|v| v * 2.0).collect();
        Series::new(x, y).with_z(z)
    }

    #[test]
    fn test_two_series_with_z() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/table.txt");
        write_table(&[ramp(10, 0.0), ramp(10, 1.0)], None, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("x0,y0,z0,x1,y1,z1"));
        assert_eq!(lines.clone().count(), 10, "one record per index");
        assert_eq!(lines.next(), Some("0,0,0,0,1,0"));
    }

    #[test]
    fn test_without_z() {
        let s = Series::new(vec![1.5, 2.0], vec![3.0, 4.0]);
        let text = format_table(&[s], None).unwrap();
        assert_eq!(text, "x0,y0\n1.5,3\n2,4\n");
    }

    #[test]
    fn test_custom_names() {
        let s = Series::new(vec![0.0], vec![1.0]);
        let names = vec!["depth".to_string(), "T".to_string()];
        let text = format_table(&[s.clone()], Some(names.as_slice())).unwrap();
        assert!(text.starts_with("depth,T\n"));
        let wrong = vec!["depth".to_string()];
        assert!(format_table(&[s], Some(wrong.as_slice())).is_err(), "name count must match columns");
    }

    #[test]
    fn test_unequal_lengths_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.txt");
        let err = write_table(&[ramp(10, 0.0), ramp(9, 0.0)], None, &path).unwrap_err();
        assert!(matches!(err, MapError::Config(_)), "got {err:?}");
        assert!(!path.exists(), "nothing should be written");
    }
}
