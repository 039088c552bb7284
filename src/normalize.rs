// Value -> [0, 1] colour scale shared by the map and its colorbar.

use serde::Deserialize;

use crate::error::{MapError, Result};

/// Smallest lower bound a logarithmic scale will use.
pub const LOG_FLOOR: f64 = 1e-5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormKind {
    #[default]
    Linear,
    #[serde(alias = "logarithmic")]
    Log,
}

/// Requested colour scale. Unset bounds are taken from the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NormalizationSpec {
    pub kind: NormKind,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
    /// Displayed colorbar range; does not change how values map to colours.
    pub colour_min: Option<f64>,
    pub colour_max: Option<f64>,
}

impl NormalizationSpec {
    pub fn linear(value_min: f64, value_max: f64) -> Self {
        Self {
            kind: NormKind::Linear,
            value_min: Some(value_min),
            value_max: Some(value_max),
            ..Self::default()
        }
    }

    pub fn log() -> Self {
        Self {
            kind: NormKind::Log,
            ..Self::default()
        }
    }

    /// Checks that only look at the explicit bounds.
    pub fn validate(&self) -> Result<()> {
        check_order("value", self.value_min, self.value_max)?;
        check_order("colour", self.colour_min, self.colour_max)?;
        if self.kind == NormKind::Log {
            for (name, v) in [
                ("value_min", self.value_min),
                ("value_max", self.value_max),
                ("colour_min", self.colour_min),
                ("colour_max", self.colour_max),
            ] {
                if let Some(v) = v
                    && v <= 0.0
                {
                    return Err(MapError::config(format!(
                        "log normalization needs a positive {name}, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_order(what: &str, lo: Option<f64>, hi: Option<f64>) -> Result<()> {
    for v in [lo, hi].into_iter().flatten() {
        if !v.is_finite() {
            return Err(MapError::config(format!("{what} bound {v} is not finite")));
        }
    }
    if let (Some(lo), Some(hi)) = (lo, hi)
        && lo >= hi
    {
        return Err(MapError::config(format!(
            "{what}_min ({lo}) must be below {what}_max ({hi})"
        )));
    }
    Ok(())
}

/// Where the resolved value bounds came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundsSource {
    Explicit,
    DataDerived,
    /// One bound explicit, the other from the data.
    Mixed,
}

/// Resolved colour scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalizer {
    kind: NormKind,
    value_min: f64,
    value_max: f64,
    colour_min: f64,
    colour_max: f64,
    source: BoundsSource,
}

/// Finite min/max of the data, `None` when nothing is finite.
pub fn observed_range(data: &[f64]) -> Option<(f64, f64)> {
    let mut vmin = f64::INFINITY;
    let mut vmax = f64::NEG_INFINITY;
    for &v in data.iter().filter(|v| v.is_finite()) {
        vmin = vmin.min(v);
        vmax = vmax.max(v);
    }
    (vmin <= vmax).then_some((vmin, vmax))
}

impl Normalizer {
    pub fn resolve(spec: &NormalizationSpec, data: &[f64]) -> Result<Self> {
        spec.validate()?;
        // An unset log minimum is the fixed floor, not a data bound.
        let min_fixed = spec.value_min.is_some() || spec.kind == NormKind::Log;
        let source = match (min_fixed, spec.value_max.is_some()) {
            (true, true) => BoundsSource::Explicit,
            (false, false) => BoundsSource::DataDerived,
            _ => BoundsSource::Mixed,
        };
        let observed = if source == BoundsSource::Explicit {
            None
        } else {
            Some(observed_range(data).ok_or_else(|| {
                MapError::config("field has no finite values to derive normalization bounds from")
            })?)
        };
        let (obs_min, obs_max) = observed.unwrap_or((f64::NAN, f64::NAN));

        let (mut lo, mut hi) = match spec.kind {
            NormKind::Linear => (
                spec.value_min.unwrap_or(obs_min),
                spec.value_max.unwrap_or(obs_max),
            ),
            NormKind::Log => (
                spec.value_min.unwrap_or(LOG_FLOOR),
                spec.value_max.unwrap_or(obs_max),
            ),
        };

        if lo >= hi {
            match (spec.kind, spec.value_min, spec.value_max) {
                (NormKind::Linear, None, None) => {
                    lo -= 0.5;
                    hi += 0.5;
                }
                (NormKind::Linear, Some(_), None) if lo == hi => hi += 0.5,
                (NormKind::Linear, None, Some(_)) if lo == hi => lo -= 0.5,
                (NormKind::Log, _, None) => hi = lo * 10.0,
                _ => {
                    return Err(MapError::config(format!(
                        "normalization bounds collapse: value_min {lo} >= value_max {hi}"
                    )));
                }
            }
        }

        let colour_min = spec.colour_min.unwrap_or(lo);
        let colour_max = spec.colour_max.unwrap_or(hi);
        if colour_min >= colour_max {
            return Err(MapError::config(format!(
                "colour range is empty: {colour_min} >= {colour_max}"
            )));
        }

        Ok(Self {
            kind: spec.kind,
            value_min: lo,
            value_max: hi,
            colour_min,
            colour_max,
            source,
        })
    }

    /// Map a value to `[0, 1]`, clamped. NaN stays NaN.
    pub fn normalize(&self, v: f64) -> f64 {
        if v.is_nan() {
            return f64::NAN;
        }
        let t = match self.kind {
            NormKind::Linear => (v - self.value_min) / (self.value_max - self.value_min),
            NormKind::Log => {
                let v = v.max(self.value_min);
                (v.ln() - self.value_min.ln()) / (self.value_max.ln() - self.value_min.ln())
            }
        };
        t.clamp(0.0, 1.0)
    }

    pub fn kind(&self) -> NormKind {
        self.kind
    }

    pub fn value_min(&self) -> f64 {
        self.value_min
    }

    pub fn value_max(&self) -> f64 {
        self.value_max
    }

    /// Range the colorbar axis spans.
    pub fn colour_range(&self) -> (f64, f64) {
        (self.colour_min, self.colour_max)
    }

    pub fn source(&self) -> BoundsSource {
        self.source
    }

    pub fn is_data_derived(&self) -> bool {
        self.source != BoundsSource::Explicit
    }
}
