// Paints a gridded or per-face surface into the map frame.

use super::axes::Frame;
use super::canvas::Canvas;
use super::color::Palette;
use crate::error::{MapError, Result};
use crate::interp::{FacePatch, GridRender, LonLatGrid, Surface, Triangulation};
use crate::normalize::{NormKind, Normalizer, observed_range};

/// Value -> colour rule shared by the map and its colorbar.
#[derive(Clone, Copy, Debug)]
pub struct Shading<'a> {
    pub normalizer: &'a Normalizer,
    pub palette: Palette,
    /// Contour levels; when set, values are painted with their band's colour
    /// and values outside the levels stay empty.
    pub levels: Option<&'a [f64]>,
}

impl Shading<'_> {
    pub fn colour(&self, v: f64) -> Option<[u8; 3]> {
        match self.levels {
            Some(levels) => {
                let k = band_of(levels, v)?;
                let mid = match self.normalizer.kind() {
                    NormKind::Linear => (levels[k] + levels[k + 1]) / 2.0,
                    NormKind::Log => (levels[k] * levels[k + 1]).sqrt(),
                };
                self.palette.rgb(self.normalizer.normalize(mid))
            }
            None => self.palette.rgb(self.normalizer.normalize(v)),
        }
    }
}

/// Index of the band `[levels[k], levels[k + 1]]` containing `v`.
pub fn band_of(levels: &[f64], v: f64) -> Option<usize> {
    let (first, last) = (*levels.first()?, *levels.last()?);
    if levels.len() < 2 || !(v >= first && v <= last) {
        return None;
    }
    let k = levels.partition_point(|&l| l <= v);
    Some((k.max(1) - 1).min(levels.len() - 2))
}

pub const MAX_LEVELS: usize = 1000;

/// Contour levels for a contoured surface.
///
/// With a step, levels run from the colour range minimum by `step`, and the
/// maximum is appended when not hit. A step giving more than [`MAX_LEVELS`]
/// bands is a configuration error. Without one they are round numbers
/// covering the finite data (decades for a log scale).
pub fn contour_levels(step: Option<f64>, normalizer: &Normalizer, data: &[f64]) -> Result<Vec<f64>> {
    if let Some(step) = step.filter(|s| *s > 0.0) {
        let (lo, hi) = normalizer.colour_range();
        let bands = ((hi - lo) / step).ceil();
        if bands > MAX_LEVELS as f64 {
            return Err(MapError::config(format!(
                "contour_step {step} gives {bands} bands over {lo}..{hi} (at most {MAX_LEVELS})"
            )));
        }
        let mut levels: Vec<f64> = (0..=MAX_LEVELS)
            .map(|k| lo + k as f64 * step)
            .take_while(|&l| l < hi + step / 10.0)
            .collect();
        if levels.last().is_some_and(|&l| l < hi - step * 1e-9) {
            levels.push(hi);
        }
        if levels.len() < 2 {
            levels = vec![lo, hi];
        }
        return Ok(levels);
    }

    let (lo, hi) = observed_range(data).unwrap_or_else(|| normalizer.colour_range());
    match normalizer.kind() {
        NormKind::Log => {
            let lo = lo.max(normalizer.value_min());
            let hi = hi.max(lo);
            let k0 = lo.log10().floor() as i32;
            let mut k1 = hi.log10().ceil() as i32;
            if k1 <= k0 {
                k1 = k0 + 1;
            }
            Ok((k0..=k1).map(|k| 10f64.powi(k)).collect())
        }
        NormKind::Linear => {
            if lo == hi {
                return Ok(vec![lo - 0.5, hi + 0.5]);
            }
            let step = super::axes::nice_step(hi - lo, 7);
            let k0 = (lo / step).floor() as i64;
            let k1 = (hi / step).ceil() as i64;
            Ok((k0..=k1).map(|k| k as f64 * step).collect())
        }
    }
}

/// Paint a surface inside `frame.rect`. Pixels with no value keep their colour.
pub fn paint_surface(canvas: &mut Canvas, frame: &Frame, surface: &Surface, shading: &Shading, edges: Option<[u8; 3]>) {
    match surface {
        Surface::Gridded { grid, values, render } => paint_grid(canvas, frame, grid, values, *render, shading),
        Surface::Faces { patches, .. } => {
            for patch in patches {
                fill_patch(canvas, frame, patch, shading);
            }
            if let Some(color) = edges {
                for patch in patches {
                    stroke_patch(canvas, frame, patch, color);
                }
            }
        }
        Surface::Triangulated { mesh, values } => paint_triangulated(canvas, frame, mesh, values, shading),
    }
}

fn paint_grid(canvas: &mut Canvas, frame: &Frame, grid: &LonLatGrid, values: &[f64], render: GridRender, shading: &Shading) {
    let r = frame.rect.clip_to(&canvas.bounds());
    let (nx, ny) = (grid.nx, grid.ny);
    let at = |i: usize, j: usize| values[j * nx + i];
    for py in r.y..r.bottom() {
        for px in r.x..r.right() {
            let (lon, lat) = frame.data_at(px as f64 + 0.5, py as f64 + 0.5);
            let fi = (lon - grid.lon(0)) / grid.dlon();
            let fj = (lat - grid.lat(0)) / grid.dlat();
            let inside = fi >= 0.0 && fj >= 0.0 && fi <= (nx - 1) as f64 && fj <= (ny - 1) as f64;
            let v = match render {
                GridRender::Contour | GridRender::Pcolor if !inside => continue,
                GridRender::Contour => {
                    let i0 = (fi.floor() as usize).min(nx - 2);
                    let j0 = (fj.floor() as usize).min(ny - 2);
                    let (s, t) = (fi - i0 as f64, fj - j0 as f64);
                    let (a, b) = (at(i0, j0), at(i0 + 1, j0));
                    let (c, d) = (at(i0, j0 + 1), at(i0 + 1, j0 + 1));
                    // A missing corner leaves the whole cell empty.
                    (1.0 - t) * ((1.0 - s) * a + s * b) + t * ((1.0 - s) * c + s * d)
                }
                GridRender::Pcolor => {
                    let i0 = (fi.floor() as usize).min(nx - 2);
                    let j0 = (fj.floor() as usize).min(ny - 2);
                    at(i0, j0)
                }
                GridRender::Image => {
                    // Each node owns an equal slice of the -180..180 x -90..90 extent.
                    let u = (lon - grid.lon(0)) / (grid.lon(nx - 1) - grid.lon(0));
                    let w = (lat - grid.lat(0)) / (grid.lat(ny - 1) - grid.lat(0));
                    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&w) {
                        continue;
                    }
                    let i = ((u * nx as f64) as usize).min(nx - 1);
                    let j = ((w * ny as f64) as usize).min(ny - 1);
                    at(i, j)
                }
            };
            if let Some(color) = shading.colour(v) {
                canvas.set(px, py, color);
            }
        }
    }
}

fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Calls `shade` with the barycentric weights of every pixel centre inside
/// the triangle and paints what it returns.
fn rasterize(canvas: &mut Canvas, frame: &Frame, corners: [[f64; 2]; 3], mut shade: impl FnMut([f64; 3]) -> Option<[u8; 3]>) {
    let [a, b, c] = corners.map(|p| frame.to_px(p[0], p[1]));
    let area = orient(a, b, c);
    if area == 0.0 {
        return;
    }
    let clip = frame.rect.clip_to(&canvas.bounds());
    let x0 = (a.0.min(b.0).min(c.0).floor() as i64).max(clip.x);
    let x1 = (a.0.max(b.0).max(c.0).ceil() as i64).min(clip.right());
    let y0 = (a.1.min(b.1).min(c.1).floor() as i64).max(clip.y);
    let y1 = (a.1.max(b.1).max(c.1).ceil() as i64).min(clip.bottom());
    for py in y0..y1 {
        for px in x0..x1 {
            let p = (px as f64 + 0.5, py as f64 + 0.5);
            let w = [orient(b, c, p) / area, orient(c, a, p) / area, orient(a, b, p) / area];
            if w.iter().all(|&wi| wi >= 0.0)
                && let Some(color) = shade(w)
            {
                canvas.set(px, py, color);
            }
        }
    }
}

fn fill_patch(canvas: &mut Canvas, frame: &Frame, patch: &FacePatch, shading: &Shading) {
    let Some(color) = shading.colour(patch.value) else {
        return;
    };
    rasterize(canvas, frame, patch.corners, |_| Some(color));
}

/// Each triangle is shaded from the linear blend of its corner values, so
/// contour bands bend across it without a grid in between.
fn paint_triangulated(canvas: &mut Canvas, frame: &Frame, mesh: &Triangulation, values: &[f64], shading: &Shading) {
    let pts = mesh.points();
    for t in mesh.triangles() {
        let v = t.map(|i| values[i]);
        rasterize(canvas, frame, t.map(|i| pts[i]), |w| {
            shading.colour(w[0] * v[0] + w[1] * v[1] + w[2] * v[2])
        });
    }
}

fn stroke_patch(canvas: &mut Canvas, frame: &Frame, patch: &FacePatch, color: [u8; 3]) {
    let pts = patch
        .corners
        .map(|p| frame.to_px(p[0], p[1]))
        .map(|(x, y)| (x.floor() as i64, y.floor() as i64));
    let clip = Some(frame.rect);
    for k in 0..3 {
        let (x0, y0) = pts[k];
        let (x1, y1) = pts[(k + 1) % 3];
        canvas.line(x0, y0, x1, y1, color, clip);
    }
}
