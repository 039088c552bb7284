//! Calibrated longitude/latitude maps of scalar fields on triangulated
//! shape models, with matching tabular export.
//!
//! [`pipeline::render_map`] is the main entry point: it projects a field
//! onto the sphere, grids it with the configured [`interp::Strategy`],
//! colours it through a shared [`normalize::Normalizer`] and draws the map
//! with its colorbar before saving, exporting and showing the result.

pub mod config;
pub mod error;
pub mod geometry;
pub mod interp;
pub mod io;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod renderer;
pub mod seam;
pub mod series;
pub mod style;
pub mod table;

pub use config::{ChartConfig, MapConfig};
pub use error::{MapError, Result};
pub use pipeline::{RenderOutcome, render_chart, render_map};

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stderr. `RUST_LOG` overrides the default `info`
/// filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
