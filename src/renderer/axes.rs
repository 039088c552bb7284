// Data <-> pixel transforms, tick placement and axis decoration.

use serde::Deserialize;

use super::canvas::{Canvas, PixelRect};
use super::font::{self, HAlign, TextSize, VAlign};
use crate::style::Style;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

/// Maps a data interval onto `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisTransform {
    pub lo: f64,
    pub hi: f64,
    pub scale: AxisScale,
}

impl AxisTransform {
    pub fn new(lo: f64, hi: f64, scale: AxisScale) -> Self {
        Self { lo, hi, scale }
    }

    pub fn frac(&self, v: f64) -> f64 {
        match self.scale {
            AxisScale::Linear => (v - self.lo) / (self.hi - self.lo),
            AxisScale::Log => (v.ln() - self.lo.ln()) / (self.hi.ln() - self.lo.ln()),
        }
    }

    pub fn value_at(&self, f: f64) -> f64 {
        match self.scale {
            AxisScale::Linear => self.lo + f * (self.hi - self.lo),
            AxisScale::Log => (self.lo.ln() + f * (self.hi.ln() - self.lo.ln())).exp(),
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        let (a, b) = if self.lo <= self.hi {
            (self.lo, self.hi)
        } else {
            (self.hi, self.lo)
        };
        let eps = (b - a).abs() * 1e-9;
        v >= a - eps && v <= b + eps
    }
}

/// Tick placement rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Locator {
    /// Every multiple of the interval inside the range.
    Multiple(f64),
    /// Round steps (1, 2, 2.5, 5 x 10^k) giving about `n` intervals.
    Nice(usize),
    /// Powers of ten.
    Decades,
}

impl Locator {
    pub fn ticks(&self, lo: f64, hi: f64) -> Vec<f64> {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match *self {
            Locator::Multiple(step) => multiples(lo, hi, step),
            Locator::Nice(n) => multiples(lo, hi, nice_step(hi - lo, n)),
            Locator::Decades => {
                if hi <= 0.0 {
                    return Vec::new();
                }
                let lo = lo.max(f64::MIN_POSITIVE);
                let k0 = (lo.log10() - 1e-9).ceil() as i32;
                let k1 = (hi.log10() + 1e-9).floor() as i32;
                (k0..=k1).map(|k| 10f64.powi(k)).collect()
            }
        }
    }

    /// Interval used to pick label precision.
    pub fn step(&self, lo: f64, hi: f64) -> f64 {
        match *self {
            Locator::Multiple(step) => step,
            Locator::Nice(n) => nice_step((hi - lo).abs(), n),
            Locator::Decades => 1.0,
        }
    }
}

fn multiples(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || hi - lo > step * 1e4 {
        return Vec::new();
    }
    let eps = step * 1e-9;
    let k0 = ((lo - eps) / step).ceil() as i64;
    let k1 = ((hi + eps) / step).floor() as i64;
    (k0..=k1)
        .map(|k| {
            let v = k as f64 * step;
            // Snap -0.0 and float dust to a clean value.
            if v.abs() < eps { 0.0 } else { v }
        })
        .collect()
}

/// Round step size giving about `n` intervals over `range`.
pub fn nice_step(range: f64, n: usize) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return 1.0;
    }
    let raw = range / n.max(1) as f64;
    let mag = 10f64.powf(raw.log10().floor());
    for m in [1.0, 2.0, 2.5, 5.0, 10.0] {
        if m * mag >= raw * (1.0 - 1e-9) {
            return m * mag;
        }
    }
    10.0 * mag
}

/// Label for a tick on a linear axis with the given tick interval.
pub fn format_tick(v: f64, step: f64) -> String {
    let mut decimals = 0;
    while decimals < 6 {
        let scaled = step * 10f64.powi(decimals as i32);
        if (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0) {
            break;
        }
        decimals += 1;
    }
    let s = format!("{v:.decimals$}");
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Label for a power-of-ten tick.
pub fn format_decade(v: f64) -> String {
    let k = v.log10().round() as i32;
    if (-2..=4).contains(&k) {
        format_tick(v, 10f64.powi(k.min(0)))
    } else {
        format!("1e{k}")
    }
}

/// Plot area with its data transforms. Y grows upward in data space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub rect: PixelRect,
    pub x: AxisTransform,
    pub y: AxisTransform,
}

impl Frame {
    pub fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.rect.x as f64 + self.x.frac(x) * self.rect.w as f64,
            self.rect.y as f64 + (1.0 - self.y.frac(y)) * self.rect.h as f64,
        )
    }

    /// Data coordinates at a (sub)pixel position.
    pub fn data_at(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.x.value_at((px - self.rect.x as f64) / self.rect.w as f64),
            self.y.value_at(1.0 - (py - self.rect.y as f64) / self.rect.h as f64),
        )
    }
}

const SUB_DECADE_TICKS: usize = 5;

/// Ticks, labels and title for one axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisDecor {
    pub ticks: Vec<f64>,
    pub labels: Vec<String>,
    pub title: Option<String>,
}

impl AxisDecor {
    /// Decades that would leave fewer than two ticks (a range inside one
    /// decade) fall back to round linear steps.
    pub fn new(transform: &AxisTransform, locator: Locator, title: Option<&str>) -> Self {
        let locator = match locator {
            Locator::Decades if Locator::Decades.ticks(transform.lo, transform.hi).len() < 2 => {
                Locator::Nice(SUB_DECADE_TICKS)
            }
            other => other,
        };
        let ticks = locator.ticks(transform.lo, transform.hi);
        let step = locator.step(transform.lo, transform.hi);
        let labels = ticks
            .iter()
            .map(|&v| match locator {
                Locator::Decades => format_decade(v),
                _ => format_tick(v, step),
            })
            .collect();
        Self {
            ticks,
            labels,
            title: title.map(str::to_owned),
        }
    }

    pub fn widest_label(&self, size: TextSize) -> usize {
        self.labels.iter().map(|l| size.width(l)).max().unwrap_or(0)
    }
}

/// Pixels needed left of the plot area for y ticks, labels and title.
pub fn left_gutter(y: &AxisDecor, style: &Style) -> usize {
    let size = style.text_size();
    let title = if y.title.is_some() {
        size.ch + style.padding
    } else {
        0
    };
    style.tick_length + style.padding / 2 + y.widest_label(size) + title
}

/// Pixels needed below the plot area for x ticks, labels and title.
pub fn bottom_gutter(x: &AxisDecor, style: &Style) -> usize {
    let size = style.text_size();
    let title = if x.title.is_some() {
        size.ch + style.padding
    } else {
        0
    };
    style.tick_length + style.padding / 2 + size.ch + title
}

fn tick_pixels(frame: &Frame, x: &AxisDecor, y: &AxisDecor) -> (Vec<i64>, Vec<i64>) {
    let r = frame.rect;
    let xs = x
        .ticks
        .iter()
        .map(|&v| (frame.to_px(v, frame.y.lo).0.round() as i64).clamp(r.x, r.right() - 1))
        .collect();
    let ys = y
        .ticks
        .iter()
        .map(|&v| (frame.to_px(frame.x.lo, v).1.round() as i64).clamp(r.y, r.bottom() - 1))
        .collect();
    (xs, ys)
}

/// Grid lines through every tick, clipped to the plot area.
pub fn draw_grid(canvas: &mut Canvas, frame: &Frame, x: &AxisDecor, y: &AxisDecor, style: &Style) {
    let r = frame.rect;
    let (xs, ys) = tick_pixels(frame, x, y);
    for &px in &xs {
        canvas.line(px, r.y, px, r.bottom() - 1, style.grid, Some(r));
    }
    for &py in &ys {
        canvas.line(r.x, py, r.right() - 1, py, style.grid, Some(r));
    }
}

/// Draw the frame outline, outward ticks, labels and titles.
pub fn draw_frame(canvas: &mut Canvas, frame: &Frame, x: &AxisDecor, y: &AxisDecor, style: &Style) {
    let r = frame.rect;
    let fg = style.foreground;
    let size = style.text_size();
    let tick = style.tick_length as i64;
    let gap = (style.padding / 2) as i64;
    let (xs, ys) = tick_pixels(frame, x, y);

    canvas.stroke_rect(r, fg);

    for (&px, label) in xs.iter().zip(&x.labels) {
        canvas.line(px, r.bottom(), px, r.bottom() + tick - 1, fg, None);
        font::draw_label(canvas, px, r.bottom() + tick + gap, label, fg, size, HAlign::Center, VAlign::Top);
    }
    for (&py, label) in ys.iter().zip(&y.labels) {
        canvas.line(r.x - tick, py, r.x - 1, py, fg, None);
        font::draw_label(canvas, r.x - tick - gap, py, label, fg, size, HAlign::Right, VAlign::Middle);
    }

    if let Some(title) = &x.title {
        let ty = r.bottom() + tick + gap + size.ch as i64 + style.padding as i64;
        font::draw_label(canvas, r.x + r.w / 2, ty, title, fg, size, HAlign::Center, VAlign::Top);
    }
    if let Some(title) = &y.title {
        let tx = r.x - left_gutter(y, style) as i64;
        let th = size.width(title) as i64;
        font::draw_text_vertical(canvas, tx, r.y + r.h / 2 - th / 2, title, fg, size);
    }
}
