//! Error types shared by every stage of the map pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a render or export call.
///
/// Geometric degeneracies (zero-length vectors, samples outside the
/// triangulation hull) are not errors: they flow through as data (angle 0,
/// NaN cells rendered empty).
#[derive(Debug, Error)]
pub enum MapError {
    /// Invalid or inconsistent configuration: unknown strategy or sub-mode,
    /// mismatched lengths, unusable normalization bounds.
    #[error("configuration error: {0}")]
    Config(String),
    /// Mesh topology is invalid (face index out of range).
    #[error("invalid mesh: {0}")]
    Mesh(String),
    /// Interpolant could not be built from the samples.
    #[error("interpolation failed: {0}")]
    Interpolation(String),
    /// Filesystem failure with the offending path.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed input file.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// PNG encoding failed.
    #[error("image encoding failed: {0}")]
    Encode(String),
    /// No usable display backend, or the backend failed.
    #[error("display failed: {0}")]
    Display(String),
}

impl MapError {
    /// Shorthand for [`MapError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
