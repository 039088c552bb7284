//! Entry points tying the stages together: validate, normalise, grid, draw,
//! then save, export and show.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ChartConfig, MapConfig, OutputConfig};
use crate::error::Result;
use crate::interp::{self, FieldInput, Surface};
use crate::normalize::Normalizer;
use crate::output;
use crate::renderer::{self, canvas::Canvas};
use crate::series::Series;
use crate::style::{self, Style};
use crate::table;

/// What a render produced, including the data-dependent choices it made.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub canvas: Canvas,
    pub image_path: Option<PathBuf>,
    pub table_path: Option<PathBuf>,
    /// True when some normalization bound came from the field itself, so the
    /// colour scale changes with the data.
    pub data_derived_bounds: bool,
    /// Faces the seam corrector changed (mesh-direct only).
    pub seam_corrections: usize,
}

/// Render a map with the process-wide style.
pub fn render_map(input: &FieldInput, cfg: &MapConfig) -> Result<RenderOutcome> {
    render_map_with(input, cfg, style::current())
}

pub fn render_map_with(input: &FieldInput, cfg: &MapConfig, style: &Style) -> Result<RenderOutcome> {
    cfg.validate()?;
    info!(strategy = %cfg.strategy, samples = input.values.len(), "rendering map");

    let normalizer = Normalizer::resolve(&cfg.normalization, input.values)?;
    if normalizer.is_data_derived() {
        warn!(
            source = ?normalizer.source(),
            min = normalizer.value_min(),
            max = normalizer.value_max(),
            "normalization bounds derived from the field; colours are not comparable across renders"
        );
    }

    let surface = interp::render_field(input, cfg.strategy, &cfg.field_options())?;
    let seam_corrections = match &surface {
        Surface::Faces { corrected, .. } => *corrected,
        Surface::Gridded { .. } | Surface::Triangulated { .. } => 0,
    };
    if seam_corrections > 0 {
        info!(faces = seam_corrections, "corrected seam-crossing faces");
    }

    let canvas = renderer::draw_map(&surface, &normalizer, cfg, style)?;

    let table = if cfg.output.write_table {
        let lon = input.samples.iter().map(|s| s.lon).collect();
        let lat = input.samples.iter().map(|s| s.lat).collect();
        let series = Series::new(lon, lat).with_z(input.values.to_vec());
        Some(table::format_table(&[series], None)?)
    } else {
        None
    };

    let (image_path, table_path) = finish(&canvas, table.as_deref(), &cfg.output, style)?;
    Ok(RenderOutcome {
        canvas,
        image_path,
        table_path,
        data_derived_bounds: normalizer.is_data_derived(),
        seam_corrections,
    })
}

/// Render a line chart with the process-wide style.
pub fn render_chart(series: &[Series], cfg: &ChartConfig) -> Result<RenderOutcome> {
    render_chart_with(series, cfg, style::current())
}

pub fn render_chart_with(series: &[Series], cfg: &ChartConfig, style: &Style) -> Result<RenderOutcome> {
    cfg.validate()?;
    info!(series = series.len(), "rendering chart");
    let canvas = renderer::draw_chart(series, cfg, style)?;
    let table = if cfg.output.write_table {
        Some(table::format_table(series, None)?)
    } else {
        None
    };
    let (image_path, table_path) = finish(&canvas, table.as_deref(), &cfg.output, style)?;
    Ok(RenderOutcome {
        canvas,
        image_path,
        table_path,
        data_derived_bounds: false,
        seam_corrections: 0,
    })
}

/// Save and export together, then show. Everything fallible about the
/// content has already happened, and if either file cannot be written
/// neither is left on disk.
fn finish(
    canvas: &Canvas,
    table: Option<&str>,
    out: &OutputConfig,
    style: &Style,
) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
    let image = match out.image_path() {
        Some(path) if out.save => Some((path, output::encode_png(canvas, style)?)),
        _ => None,
    };
    let table = table.zip(out.table_path());

    let mut files: Vec<(&Path, &[u8])> = Vec::new();
    if let Some((path, bytes)) = &image {
        files.push((path.as_path(), bytes.as_slice()));
    }
    if let Some((text, path)) = &table {
        files.push((path.as_path(), text.as_bytes()));
    }
    output::write_together(&files)?;

    if let Some((path, bytes)) = &image {
        info!(path = %path.display(), bytes = bytes.len(), dpi = style.dpi, "saved figure");
    }
    if let Some((text, path)) = &table {
        info!(path = %path.display(), rows = text.lines().count().saturating_sub(1), "wrote table");
    }
    if out.show {
        output::show(canvas, out.name.as_deref().unwrap_or("shapemap"), style)?;
    }
    Ok((image.map(|(path, _)| path), table.map(|(_, path)| path)))
}
