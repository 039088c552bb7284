// Data series shared by line charts and tabular export.

use serde::Deserialize;

use crate::error::{MapError, Result};

/// Default colour cycle for series without an explicit colour.
pub const CYCLE: [[u8; 3]; 10] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineStyle {
    /// Alternating on/off run lengths in pixels for a line `width` wide.
    /// Empty for a continuous line.
    pub fn pattern(&self, width: i64) -> Vec<i64> {
        let w = width.max(1);
        match self {
            LineStyle::Solid => Vec::new(),
            LineStyle::Dashed => vec![4 * w + 4, 3 * w + 2],
            LineStyle::Dotted => vec![w, 2 * w],
            LineStyle::DashDot => vec![4 * w + 4, 2 * w + 2, w, 2 * w + 2],
        }
    }
}

/// Parse a single-letter colour code (`k`, `r`, `g`, `b`, `c`, `m`, `y`, `w`)
/// or a `#rrggbb` hex string.
pub fn parse_color(s: &str) -> Result<[u8; 3]> {
    let s = s.trim();
    let named = match s {
        "k" | "black" => Some([0, 0, 0]),
        "r" | "red" => Some([255, 0, 0]),
        "g" | "green" => Some([0, 128, 0]),
        "b" | "blue" => Some([0, 0, 255]),
        "c" | "cyan" => Some([0, 191, 191]),
        "m" | "magenta" => Some([191, 0, 191]),
        "y" | "yellow" => Some([191, 191, 0]),
        "w" | "white" => Some([255, 255, 255]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Ok(rgb);
    }
    let hex = s
        .strip_prefix('#')
        .filter(|h| h.len() == 6 && h.is_ascii())
        .ok_or_else(|| MapError::config(format!("unknown colour '{s}'")))?;
    let mut rgb = [0u8; 3];
    for (i, c) in rgb.iter_mut().enumerate() {
        *c = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .map_err(|_| MapError::config(format!("bad hex colour '{s}'")))?;
    }
    Ok(rgb)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Optional third column, exported but not plotted.
    pub z: Option<Vec<f64>>,
    pub color: Option<[u8; 3]>,
    pub line_width: usize,
    pub line_style: LineStyle,
    pub label: Option<String>,
}

impl Series {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            line_width: 2,
            ..Default::default()
        }
    }

    pub fn with_z(mut self, z: Vec<f64>) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_style(mut self, line_style: LineStyle, line_width: usize) -> Self {
        self.line_style = line_style;
        self.line_width = line_width;
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of exported columns, 2 or 3.
    pub fn columns(&self) -> usize {
        if self.z.is_some() { 3 } else { 2 }
    }

    /// Colour for the `index`-th series of a chart.
    pub fn color_or_cycle(&self, index: usize) -> [u8; 3] {
        self.color.unwrap_or(CYCLE[index % CYCLE.len()])
    }

    /// All columns of one series must have the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.x.len();
        if self.y.len() != n {
            return Err(MapError::config(format!(
                "series has {n} x values but {} y values",
                self.y.len()
            )));
        }
        if let Some(z) = &self.z
            && z.len() != n
        {
            return Err(MapError::config(format!(
                "series has {n} x values but {} z values",
                z.len()
            )));
        }
        Ok(())
    }
}
