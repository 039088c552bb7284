// Line charts: depth profiles, daily curves and similar x/y series.

use super::axes::{self, AxisDecor, AxisScale, AxisTransform, Frame, Locator};
use super::canvas::{Canvas, PixelRect};
use super::font::{self, HAlign, VAlign};
use crate::config::{AxisSpec, ChartConfig};
use crate::error::{MapError, Result};
use crate::series::Series;
use crate::style::Style;

/// Length of the line sample drawn beside each legend entry.
const LEGEND_SAMPLE: i64 = 40;

/// Axis range for one dimension: explicit limits, or the finite data range
/// padded by 5% (multiplicatively on a log axis).
pub fn auto_limits<'a>(spec: &AxisSpec, values: impl Iterator<Item = &'a f64>) -> Result<AxisTransform> {
    let scale = spec.scale.unwrap_or_default();
    if let Some([lo, hi]) = spec.limits {
        return Ok(AxisTransform::new(lo, hi, scale));
    }
    let usable = |v: f64| v.is_finite() && (scale == AxisScale::Linear || v > 0.0);
    let (lo, hi) = values
        .copied()
        .filter(|&v| usable(v))
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or_else(|| MapError::config("chart has no plottable values"))?;
    Ok(match scale {
        AxisScale::Linear => {
            let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
            AxisTransform::new(lo - pad, hi + pad, scale)
        }
        AxisScale::Log => {
            let pad = if hi > lo { (hi / lo).powf(0.05) } else { 10.0 };
            AxisTransform::new(lo / pad, hi * pad, scale)
        }
    })
}

fn locator(spec: &AxisSpec, transform: &AxisTransform) -> Locator {
    match (spec.tick_interval, transform.scale) {
        (Some(step), _) => Locator::Multiple(step),
        (None, AxisScale::Log) => Locator::Decades,
        (None, AxisScale::Linear) => Locator::Nice(6),
    }
}

/// Draw one series as a polyline. Points that cannot be placed (NaN, or
/// non-positive on a log axis) break the line.
fn draw_series(canvas: &mut Canvas, frame: &Frame, series: &Series, color: [u8; 3]) {
    let width = series.line_width.max(1) as i64;
    let pattern = series.line_style.pattern(width);
    let period: i64 = pattern.iter().sum();
    let placeable = |t: &AxisTransform, v: f64| v.is_finite() && (t.scale == AxisScale::Linear || v > 0.0);
    let clip = frame.rect;
    let mut phase = 0i64;
    let mut prev: Option<(i64, i64)> = None;

    for (&x, &y) in series.x.iter().zip(&series.y) {
        if !placeable(&frame.x, x) || !placeable(&frame.y, y) {
            prev = None;
            continue;
        }
        let (px, py) = frame.to_px(x, y);
        let cur = (px.round() as i64, py.round() as i64);
        match prev {
            Some((x0, y0)) => canvas.walk_line(x0, y0, cur.0, cur.1, |c, x, y| {
                if on_dash(&pattern, period, phase) {
                    c.stamp(x, y, width, color, Some(clip));
                }
                phase += 1;
            }),
            None => canvas.stamp(cur.0, cur.1, width, color, Some(clip)),
        }
        prev = Some(cur);
    }
}

fn on_dash(pattern: &[i64], period: i64, phase: i64) -> bool {
    if period <= 0 {
        return true;
    }
    let mut at = phase % period;
    for (k, &run) in pattern.iter().enumerate() {
        if at < run {
            return k % 2 == 0;
        }
        at -= run;
    }
    true
}

fn draw_legend(canvas: &mut Canvas, frame: &Frame, entries: &[(&str, &Series, [u8; 3])], framed: bool, style: &Style) {
    if entries.is_empty() {
        return;
    }
    let size = style.text_size();
    let pad = style.padding as i64;
    let gap = (style.padding / 2) as i64;
    let row = size.ch as i64 + gap;
    let widest = entries.iter().map(|(l, _, _)| size.width(l)).max().unwrap_or(0) as i64;
    let w = pad + LEGEND_SAMPLE + gap + widest + pad;
    let h = pad + row * entries.len() as i64 - gap + pad;
    let r = frame.rect;
    let bx = PixelRect::new(r.right() - pad - w, r.y + pad, w, h);

    canvas.fill_rect(bx, style.background);
    if framed {
        canvas.stroke_rect(bx, style.foreground);
    }
    for (k, (label, series, color)) in entries.iter().enumerate() {
        let cy = bx.y + pad + k as i64 * row + size.ch as i64 / 2;
        let width = series.line_width.max(1) as i64;
        let pattern = series.line_style.pattern(width);
        let period: i64 = pattern.iter().sum();
        let x0 = bx.x + pad;
        for (i, x) in (x0..x0 + LEGEND_SAMPLE).enumerate() {
            if on_dash(&pattern, period, i as i64) {
                canvas.stamp(x, cy, width, *color, None);
            }
        }
        font::draw_label(
            canvas,
            x0 + LEGEND_SAMPLE + gap,
            cy,
            label,
            style.foreground,
            size,
            HAlign::Left,
            VAlign::Middle,
        );
    }
}

/// Render `series` as a line chart.
pub fn draw_chart(series: &[Series], cfg: &ChartConfig, style: &Style) -> Result<Canvas> {
    if series.is_empty() {
        return Err(MapError::config("chart needs at least one series"));
    }
    for s in series {
        s.validate()?;
    }
    let xt = auto_limits(&cfg.x_axis, series.iter().flat_map(|s| s.x.iter()))?;
    let yt = auto_limits(&cfg.y_axis, series.iter().flat_map(|s| s.y.iter()))?;
    let xd = AxisDecor::new(&xt, locator(&cfg.x_axis, &xt), cfg.x_axis.label.as_deref());
    let yd = AxisDecor::new(&yt, locator(&cfg.y_axis, &yt), cfg.y_axis.label.as_deref());

    let (fw, fh) = (cfg.figure.width as i64, cfg.figure.height as i64);
    let size = style.text_size();
    let pad = style.padding as i64;
    let left = pad + axes::left_gutter(&yd, style) as i64;
    let bottom = pad + axes::bottom_gutter(&xd, style) as i64;
    let top = pad + size.ch as i64 / 2;
    let right = pad + xd.labels.last().map_or(0, |l| size.width(l) as i64 / 2);
    let rect = PixelRect::new(left, top, fw - left - right, fh - top - bottom);
    if rect.w < 10 || rect.h < 10 {
        return Err(MapError::config(format!(
            "figure {}x{} is too small for the chart decorations",
            cfg.figure.width, cfg.figure.height
        )));
    }
    let frame = Frame { rect, x: xt, y: yt };

    let mut canvas = Canvas::new(cfg.figure.width, cfg.figure.height, style.background);
    if cfg.grid_lines {
        axes::draw_grid(&mut canvas, &frame, &xd, &yd, style);
    }
    let mut entries = Vec::new();
    for (k, s) in series.iter().enumerate() {
        let color = s.color_or_cycle(k);
        draw_series(&mut canvas, &frame, s, color);
        if let Some(label) = s.label.as_deref() {
            entries.push((label, s, color));
        }
    }
    axes::draw_frame(&mut canvas, &frame, &xd, &yd, style);
    if cfg.legend.show {
        draw_legend(&mut canvas, &frame, &entries, cfg.legend.frame, style);
    }
    Ok(canvas)
}
