//! Top-level error type for the CLI's own I/O (reading a replay script),
//! wrapping [`ProjectError`] for everything that goes through save/load.

use std::path::PathBuf;

use flowgrid_project::ProjectError;
use thiserror::Error;

/// Errors the `flowgrid` binary can surface, beyond what `flowgrid-project`
/// already covers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Project serialization failed.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// A replay script couldn't be read.
    #[error("failed to read replay script '{path}': {source}")]
    Io {
        /// The file in question.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A replay script wasn't valid JSON, or didn't match the expected
    /// `{ frames: [{ time, actions }] }` shape.
    #[error("malformed replay script '{path}': {source}")]
    Script {
        /// The file in question.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io { path: path.into(), source }
    }

    /// Wraps a JSON decode error with the path that caused it.
    pub fn script(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AppError::Script { path: path.into(), source }
    }
}
