use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shapemap::config::MapConfig;
use shapemap::error::{MapError, Result};
use shapemap::interp::FieldInput;
use shapemap::{io, pipeline, style};
use tracing::{error, info};

struct Defaults;

impl Defaults {
    const CONFIG: &'static str = "shapemap.yaml";
    /// Field column read when `input.column` is unset.
    const COLUMN: &'static str = "tmp";
}

/// Parse `--style <FILE>` from CLI args.
fn parse_style_path(args: &[String]) -> Option<PathBuf> {
    args.windows(2)
        .find(|w| w[0] == "--style")
        .map(|w| PathBuf::from(&w[1]))
}

/// First positional argument, or the default config file.
fn parse_config_path(args: &[String]) -> PathBuf {
    let mut skip_next = false;
    for a in args.iter().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if a == "--style" {
            skip_next = true;
            continue;
        }
        return PathBuf::from(a);
    }
    PathBuf::from(Defaults::CONFIG)
}

/// Input paths are relative to the config file.
fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() { p.to_path_buf() } else { base.join(p) }
}

fn run(config_path: &Path) -> Result<()> {
    let cfg = MapConfig::load(config_path)?;
    let base = config_path.parent().unwrap_or(Path::new(""));
    let input = &cfg.input;

    let field = input
        .field
        .as_deref()
        .ok_or_else(|| MapError::config("input.field is required"))?;
    let column = input.column.as_deref().unwrap_or(Defaults::COLUMN);
    let values = io::read_column(&resolve(base, field), column)?;
    info!(column, values = values.len(), "read field");

    let outcome = match (&input.mesh, &input.faces) {
        (Some(mesh), _) => {
            let mesh = io::read_obj(&resolve(base, mesh))?;
            info!(vertices = mesh.vertices().len(), faces = mesh.face_count(), "read mesh");
            let field = FieldInput::from_mesh(&mesh, &values, input.location)?;
            pipeline::render_map(&field, &cfg)?
        }
        (None, Some(faces)) => {
            let samples = io::read_face_table(&resolve(base, faces), input.unit)?;
            let field = FieldInput::from_samples(samples, &values)?;
            pipeline::render_map(&field, &cfg)?
        }
        (None, None) => return Err(MapError::config("input.mesh or input.faces is required")),
    };

    if let Some(path) = &outcome.image_path {
        info!("map: {}", path.display());
    }
    if let Some(path) = &outcome.table_path {
        info!("table: {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    shapemap::init_logging();
    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = parse_style_path(&args) {
        style::init(style::load(&path));
    }
    match run(&parse_config_path(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
