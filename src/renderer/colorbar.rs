// Colour bar panel: gradient, ticks, title and optional min/max marks.

use serde::Deserialize;

use super::axes::{AxisDecor, AxisScale, AxisTransform, Locator, format_tick};
use super::canvas::{Canvas, PixelRect};
use super::font::{self, HAlign, VAlign};
use super::raster::Shading;
use crate::normalize::NormKind;
use crate::style::Style;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Below the map, centred, half the figure width.
    #[default]
    Horizontal,
    /// Right of the map, map height.
    Vertical,
}

pub struct Colorbar<'a> {
    pub shading: Shading<'a>,
    pub orientation: Orientation,
    pub label: Option<&'a str>,
    pub tick_interval: Option<f64>,
    pub show_limits: bool,
}

impl Colorbar<'_> {
    /// Value axis along the bar. Contour bands span their levels.
    pub fn transform(&self) -> AxisTransform {
        let scale = match self.shading.normalizer.kind() {
            NormKind::Linear => AxisScale::Linear,
            NormKind::Log => AxisScale::Log,
        };
        let (lo, hi) = match self.shading.levels {
            Some([first, .., last]) => (*first, *last),
            _ => self.shading.normalizer.colour_range(),
        };
        AxisTransform::new(lo, hi, scale)
    }

    pub fn decor(&self) -> AxisDecor {
        let t = self.transform();
        match (self.tick_interval, self.shading.levels, t.scale) {
            (Some(step), _, _) => AxisDecor::new(&t, Locator::Multiple(step), self.label),
            (None, Some(levels), AxisScale::Linear) if levels.len() <= 12 => {
                let step = levels.get(1).map_or(1.0, |l| l - levels[0]);
                AxisDecor {
                    ticks: levels.to_vec(),
                    labels: levels.iter().map(|&v| format_tick(v, step)).collect(),
                    title: self.label.map(str::to_owned),
                }
            }
            (None, _, AxisScale::Log) => AxisDecor::new(&t, Locator::Decades, self.label),
            (None, _, AxisScale::Linear) => AxisDecor::new(&t, Locator::Nice(5), self.label),
        }
    }

    /// Values marked on the bar, in order `[min, max]`.
    pub fn limits(&self) -> Vec<(f64, String)> {
        if !self.show_limits {
            return Vec::new();
        }
        let n = self.shading.normalizer;
        [n.value_min(), n.value_max()]
            .into_iter()
            .map(|v| (v, format!("{v:.0}")))
            .collect()
    }

    /// Thickness of the bar itself for a figure of the given size.
    pub fn thickness(&self, fig_w: usize, fig_h: usize) -> usize {
        match self.orientation {
            Orientation::Horizontal => (fig_h as f64 * 0.03).round().max(10.0) as usize,
            Orientation::Vertical => (fig_w as f64 * 0.02).round().max(10.0) as usize,
        }
    }

    /// Space needed before the bar (limit labels) and after it (ticks,
    /// labels, title), measured across the bar.
    pub fn margins(&self, style: &Style) -> (usize, usize) {
        let size = style.text_size();
        let gap = style.padding / 2;
        let decor = self.decor();
        let limits = self.limits();
        match self.orientation {
            Orientation::Horizontal => {
                let before = if limits.is_empty() { 0 } else { size.ch + gap };
                let title = if decor.title.is_some() { gap + size.ch } else { 0 };
                (before, style.tick_length + gap + size.ch + title)
            }
            Orientation::Vertical => {
                let widest = limits.iter().map(|(_, l)| size.width(l)).max();
                let before = widest.map_or(0, |w| w + gap);
                let title = if decor.title.is_some() {
                    style.padding + size.ch
                } else {
                    0
                };
                (before, style.tick_length + gap + decor.widest_label(size) + title)
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, bar: PixelRect, style: &Style) {
        let t = self.transform();
        let fg = style.foreground;
        let size = style.text_size();
        let tick = style.tick_length as i64;
        let gap = (style.padding / 2) as i64;
        let horizontal = self.orientation == Orientation::Horizontal;

        // Gradient, one value per pixel along the bar.
        let len = if horizontal { bar.w } else { bar.h };
        for k in 0..len {
            let f = (k as f64 + 0.5) / len as f64;
            let f = if horizontal { f } else { 1.0 - f };
            let Some(color) = self.shading.colour(t.value_at(f)) else {
                continue;
            };
            if horizontal {
                canvas.line(bar.x + k, bar.y, bar.x + k, bar.bottom() - 1, color, None);
            } else {
                canvas.line(bar.x, bar.y + k, bar.right() - 1, bar.y + k, color, None);
            }
        }
        canvas.stroke_rect(bar, fg);

        let pos = |v: f64| -> i64 {
            let f = t.frac(v);
            if horizontal {
                (bar.x as f64 + f * bar.w as f64).round() as i64
            } else {
                (bar.y as f64 + (1.0 - f) * bar.h as f64).round() as i64
            }
        };

        let decor = self.decor();
        for (&v, label) in decor.ticks.iter().zip(&decor.labels) {
            if !t.contains(v) {
                continue;
            }
            if horizontal {
                let x = pos(v).clamp(bar.x, bar.right() - 1);
                canvas.line(x, bar.bottom(), x, bar.bottom() + tick - 1, fg, None);
                font::draw_label(canvas, x, bar.bottom() + tick + gap, label, fg, size, HAlign::Center, VAlign::Top);
            } else {
                let y = pos(v).clamp(bar.y, bar.bottom() - 1);
                canvas.line(bar.right(), y, bar.right() + tick - 1, y, fg, None);
                font::draw_label(canvas, bar.right() + tick + gap, y, label, fg, size, HAlign::Left, VAlign::Middle);
            }
        }

        if let Some(title) = &decor.title {
            if horizontal {
                let y = bar.bottom() + tick + gap + size.ch as i64 + gap;
                font::draw_label(canvas, bar.x + bar.w / 2, y, title, fg, size, HAlign::Center, VAlign::Top);
            } else {
                let x = bar.right() + tick + gap + decor.widest_label(size) as i64 + style.padding as i64;
                let th = size.width(title) as i64;
                font::draw_text_vertical(canvas, x, bar.y + bar.h / 2 - th / 2, title, fg, size);
            }
        }

        for (v, label) in self.limits() {
            if !t.contains(v) {
                tracing::debug!(value = v, "limit mark outside the colorbar range");
                continue;
            }
            if horizontal {
                // Top quarter of the bar, label centred above it.
                let x = pos(v);
                canvas.line(x, bar.y, x, bar.y + bar.h / 4, fg, None);
                font::draw_label(canvas, x, bar.y - gap, &label, fg, size, HAlign::Center, VAlign::Bottom);
            } else {
                // First 15% of the bar width, label right-aligned to its left.
                let y = pos(v);
                let reach = ((bar.w as f64) * 0.15).round().max(1.0) as i64;
                canvas.line(bar.x, y, bar.x + reach, y, fg, None);
                font::draw_label(canvas, bar.x - gap, y, &label, fg, size, HAlign::Right, VAlign::Middle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{NormalizationSpec, Normalizer};
    use crate::renderer::color::{ColorMap, Palette};

    fn bar_for(n: &Normalizer, orientation: Orientation, show_limits: bool) -> Colorbar<'_> {
        Colorbar {
            shading: Shading {
                normalizer: n,
                palette: Palette::new(ColorMap::Greys, false),
                levels: None,
            },
            orientation,
            label: Some("T (K)"),
            tick_interval: None,
            show_limits,
        }
    }

    #[test]
    fn test_horizontal_gradient_runs_left_to_right() {
        let n = Normalizer::resolve(&NormalizationSpec::linear(0.0, 400.0), &[]).unwrap();
        let cb = bar_for(&n, Orientation::Horizontal, false);
        let style = Style::default();
        let mut canvas = Canvas::new(300, 120, style.background);
        let bar = PixelRect::new(50, 40, 200, 20);
        cb.draw(&mut canvas, bar, &style);
        let left = canvas.pixel(52, 50)[0];
        let right = canvas.pixel(247, 50)[0];
        assert!(left > 240, "low end of greys is white, got {left}");
        assert!(right < 15, "high end of greys is black, got {right}");
    }

    #[test]
    fn test_vertical_gradient_runs_bottom_to_top() {
        let n = Normalizer::resolve(&NormalizationSpec::linear(0.0, 1.0), &[]).unwrap();
        let cb = bar_for(&n, Orientation::Vertical, false);
        let style = Style::default();
        let mut canvas = Canvas::new(200, 300, style.background);
        cb.draw(&mut canvas, PixelRect::new(40, 20, 20, 200), &style);
        assert!(canvas.pixel(50, 22)[0] < 15, "top is the maximum");
        assert!(canvas.pixel(50, 217)[0] > 240, "bottom is the minimum");
    }

    #[test]
    fn test_limit_marks_in_top_quarter() {
        let spec = NormalizationSpec {
            value_min: Some(100.0),
            value_max: Some(300.0),
            colour_min: Some(0.0),
            colour_max: Some(400.0),
            ..Default::default()
        };
        let n = Normalizer::resolve(&spec, &[]).unwrap();
        let cb = bar_for(&n, Orientation::Horizontal, true);
        assert_eq!(cb.limits()[0].1, "100");
        let style = Style::default();
        let mut canvas = Canvas::new(400, 160, style.background);
        let bar = PixelRect::new(0, 80, 400, 40);
        cb.draw(&mut canvas, bar, &style);
        // value 100 sits a quarter of the way along the bar.
        assert_eq!(canvas.pixel(100, 82)[..3], style.foreground);
        assert_ne!(canvas.pixel(100, 110)[..3], style.foreground, "mark stops at the top quarter");
        // Label is drawn above the bar.
        let above = (60..80).any(|y| (90..110).any(|x| canvas.pixel(x, y)[..3] == style.foreground));
        assert!(above, "limit label should be above the bar");
    }

    #[test]
    fn test_log_colorbar_uses_decades() {
        let spec = NormalizationSpec {
            kind: NormKind::Log,
            value_min: Some(1e-2),
            value_max: Some(1e2),
            ..Default::default()
        };
        let n = Normalizer::resolve(&spec, &[]).unwrap();
        let cb = bar_for(&n, Orientation::Horizontal, false);
        assert_eq!(cb.decor().labels, ["0.01", "0.1", "1", "10", "100"]);
    }

    #[test]
    fn test_log_colorbar_inside_one_decade_keeps_ticks() {
        let spec = NormalizationSpec {
            kind: NormKind::Log,
            value_min: Some(200.0),
            value_max: Some(400.0),
            ..Default::default()
        };
        let n = Normalizer::resolve(&spec, &[]).unwrap();
        let cb = bar_for(&n, Orientation::Vertical, false);
        let decor = cb.decor();
        assert_eq!(decor.ticks, [200.0, 250.0, 300.0, 350.0, 400.0]);
        assert_eq!(decor.labels, ["200", "250", "300", "350", "400"]);

        // One power of ten inside the range is still too few.
        let spec = NormalizationSpec {
            value_min: Some(5.0),
            value_max: Some(30.0),
            ..spec
        };
        let n = Normalizer::resolve(&spec, &[]).unwrap();
        assert!(bar_for(&n, Orientation::Horizontal, false).decor().ticks.len() >= 2);
    }

    #[test]
    fn test_explicit_tick_interval() {
        let n = Normalizer::resolve(&NormalizationSpec::linear(0.0, 400.0), &[]).unwrap();
        let mut cb = bar_for(&n, Orientation::Horizontal, false);
        cb.tick_interval = Some(100.0);
        assert_eq!(cb.decor().ticks, [0.0, 100.0, 200.0, 300.0, 400.0]);
    }
}
