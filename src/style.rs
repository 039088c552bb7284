// Process-wide figure style, loaded once and never mutated.

use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::warn;

use crate::renderer::font::TextSize;

pub const STYLE_FILE: &str = "shapemap-style.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Resolution recorded in saved PNGs.
    pub dpi: u32,
    /// Integer magnification of the 5x7 bitmap font.
    pub font_scale: usize,
    pub background: [u8; 3],
    pub foreground: [u8; 3],
    pub grid: [u8; 3],
    pub tick_length: usize,
    /// Gap between figure elements, in pixels.
    pub padding: usize,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            dpi: 300,
            font_scale: 2,
            background: [255, 255, 255],
            foreground: [0, 0, 0],
            grid: [176, 176, 176],
            tick_length: 8,
            padding: 12,
        }
    }
}

impl Style {
    pub fn text_size(&self) -> TextSize {
        TextSize::scaled(self.font_scale)
    }

    /// Pixels per metre for the PNG `pHYs` chunk.
    pub fn pixels_per_metre(&self) -> u32 {
        (self.dpi as f64 / 0.0254).round() as u32
    }
}

static STYLE: OnceLock<Style> = OnceLock::new();

/// Install the process-wide style. Returns false if one is already in place
/// (set explicitly or loaded by an earlier render).
pub fn init(style: Style) -> bool {
    STYLE.set(style).is_ok()
}

/// The process-wide style, loading [`STYLE_FILE`] on first use.
pub fn current() -> &'static Style {
    STYLE.get_or_init(|| load(Path::new(STYLE_FILE)))
}

/// Read a style file. A missing file gives the defaults; an unreadable or
/// malformed one logs a warning and gives the defaults.
pub fn load(path: &Path) -> Style {
    if !path.exists() {
        return Style::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(style) => style,
            Err(e) => {
                warn!("failed to parse {}: {e}; using default style", path.display());
                Style::default()
            }
        },
        Err(e) => {
            warn!("failed to read {}: {e}; using default style", path.display());
            Style::default()
        }
    }
}
