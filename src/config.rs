use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MapError, Result};
use crate::geometry::{AngleUnit, FieldLocation};
use crate::interp::{FieldOptions, LonLatGrid, RbfOptions, Strategy};
use crate::normalize::NormalizationSpec;
use crate::renderer::axes::AxisScale;
use crate::renderer::color::ColorMap;
use crate::renderer::colorbar::Orientation;
use crate::seam::{SeamCorrector, SeamMatch};

/// Everything one map render needs besides the field itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub strategy: Strategy,
    pub grid: LonLatGrid,
    pub rbf: RbfOptions,
    pub seam: SeamCorrector,
    /// Outline faces in mesh-direct mode.
    pub mesh_edges: bool,
    pub normalization: NormalizationSpec,
    /// Spacing of filled-contour levels; automatic when unset.
    pub contour_step: Option<f64>,
    pub colormap: ColorMap,
    pub reverse_colormap: bool,
    pub colorbar: ColorbarConfig,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub grid_lines: bool,
    pub figure: FigureSize,
    pub output: OutputConfig,
    /// Input files; read by the binary only.
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorbarConfig {
    pub label: Option<String>,
    pub orientation: Orientation,
    pub tick_interval: Option<f64>,
    /// Mark `value_min` and `value_max` on the bar.
    pub show_limits: bool,
}

/// One axis. `None` fields are chosen automatically.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisSpec {
    pub label: Option<String>,
    pub limits: Option<[f64; 2]>,
    pub tick_interval: Option<f64>,
    pub scale: Option<AxisScale>,
}

/// Figure size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FigureSize {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base file name shared by the image and the table.
    pub name: Option<String>,
    pub dir: PathBuf,
    pub save: bool,
    pub show: bool,
    pub write_table: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Wavefront OBJ shape model.
    pub mesh: Option<PathBuf>,
    /// Face table with `x,y,z,lon,lat,rad` columns, used when no mesh is given.
    pub faces: Option<PathBuf>,
    /// CSV holding the scalar field.
    pub field: Option<PathBuf>,
    /// Column of `field` to map.
    pub column: Option<String>,
    pub location: FieldLocation,
    /// Angle unit of the face table.
    pub unit: AngleUnit,
}

/// Line chart options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub grid_lines: bool,
    pub legend: LegendConfig,
    pub figure: FigureSize,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub show: bool,
    pub frame: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            grid: LonLatGrid::default(),
            rbf: RbfOptions::default(),
            seam: SeamCorrector::default(),
            mesh_edges: true,
            normalization: NormalizationSpec::default(),
            contour_step: None,
            colormap: ColorMap::default(),
            reverse_colormap: false,
            colorbar: ColorbarConfig::default(),
            x_axis: AxisSpec {
                label: Some("Longitude (deg)".into()),
                ..Default::default()
            },
            y_axis: AxisSpec {
                label: Some("Latitude (deg)".into()),
                ..Default::default()
            },
            grid_lines: false,
            figure: FigureSize::default(),
            output: OutputConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl Default for ColorbarConfig {
    fn default() -> Self {
        Self {
            label: None,
            orientation: Orientation::Horizontal,
            tick_interval: None,
            show_limits: false,
        }
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 730,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: None,
            dir: PathBuf::from("out"),
            save: false,
            show: false,
            write_table: false,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            x_axis: AxisSpec::default(),
            y_axis: AxisSpec::default(),
            grid_lines: true,
            legend: LegendConfig::default(),
            figure: FigureSize {
                width: 1200,
                height: 900,
            },
            output: OutputConfig::default(),
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            show: true,
            frame: true,
        }
    }
}

impl OutputConfig {
    /// `<dir>/<name>.png`, if a name is set.
    pub fn image_path(&self) -> Option<PathBuf> {
        self.name.as_ref().map(|n| self.dir.join(format!("{n}.png")))
    }

    /// `<dir>/<name>.txt`, if a name is set.
    pub fn table_path(&self) -> Option<PathBuf> {
        self.name.as_ref().map(|n| self.dir.join(format!("{n}.txt")))
    }

    fn validate(&self) -> Result<()> {
        if (self.save || self.write_table) && self.name.as_deref().is_none_or(str::is_empty) {
            return Err(MapError::config("output.name is required when saving or exporting"));
        }
        Ok(())
    }
}

impl AxisSpec {
    fn validate(&self, axis: &str) -> Result<()> {
        if let Some([lo, hi]) = self.limits
            && (!lo.is_finite() || !hi.is_finite() || lo >= hi)
        {
            return Err(MapError::config(format!(
                "{axis} limits must be finite and increasing, got [{lo}, {hi}]"
            )));
        }
        if let Some(step) = self.tick_interval
            && (!step.is_finite() || step <= 0.0)
        {
            return Err(MapError::config(format!("{axis} tick_interval must be positive, got {step}")));
        }
        if self.scale == Some(AxisScale::Log)
            && let Some([lo, _]) = self.limits
            && lo <= 0.0
        {
            return Err(MapError::config(format!("{axis} log scale needs positive limits")));
        }
        Ok(())
    }
}

impl FigureSize {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::config(format!(
                "figure size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl MapConfig {
    /// Parse YAML; unknown strategy or mode names are rejected here.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| MapError::config(format!("invalid map config: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MapError::io(path, e))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MapError::config(format!("invalid map config {}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.nx < 2 || self.grid.ny < 2 {
            return Err(MapError::config(format!(
                "grid needs at least 2x2 nodes, got {}x{}",
                self.grid.nx, self.grid.ny
            )));
        }
        if !self.seam.threshold.is_finite() || self.seam.threshold <= 0.0 {
            return Err(MapError::config(format!(
                "seam threshold must be positive, got {}",
                self.seam.threshold
            )));
        }
        if let SeamMatch::Tolerance(eps) = self.seam.matching
            && (!eps.is_finite() || eps < 0.0)
        {
            return Err(MapError::config(format!("seam tolerance must be non-negative, got {eps}")));
        }
        if let Some(step) = self.contour_step
            && (!step.is_finite() || step <= 0.0)
        {
            return Err(MapError::config(format!("contour_step must be positive, got {step}")));
        }
        if let Some(step) = self.colorbar.tick_interval
            && (!step.is_finite() || step <= 0.0)
        {
            return Err(MapError::config(format!(
                "colorbar tick_interval must be positive, got {step}"
            )));
        }
        for (name, axis) in [("x_axis", &self.x_axis), ("y_axis", &self.y_axis)] {
            axis.validate(name)?;
            if axis.scale == Some(AxisScale::Log) {
                return Err(MapError::config(format!("{name} of a map cannot be logarithmic")));
            }
        }
        self.normalization.validate()?;
        self.figure.validate()?;
        self.output.validate()
    }

    pub fn field_options(&self) -> FieldOptions {
        FieldOptions {
            grid: self.grid,
            rbf: self.rbf,
            seam: self.seam,
        }
    }
}

impl ChartConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| MapError::config(format!("invalid chart config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        self.x_axis.validate("x_axis")?;
        self.y_axis.validate("y_axis")?;
        self.figure.validate()?;
        self.output.validate()
    }
}
