//! Error types for project serialization.

use std::path::PathBuf;

use flowgrid_path::Path as StorePath;
use thiserror::Error;

/// Errors that can occur loading or saving a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The file could not be read or written.
    #[error("failed to access '{path}': {source}")]
    Io {
        /// The file in question.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents were not valid JSON, or didn't match the
    /// expected shape for its format.
    #[error("malformed project file '{path}': {source}")]
    Json {
        /// The file in question.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The file extension has no registered format.
    #[error("no project format registered for extension of '{0}'")]
    UnknownExtension(PathBuf),

    /// A snapshot contained a path with no registered component to supply
    /// its expected primitive kind (§7 kind 2, `NotFound`).
    #[error("no component registered at '{0}'; load aborted")]
    NotFound(StorePath),

    /// A primitive value didn't decode against its expected kind.
    #[error("path '{path}': {source}")]
    Primitive {
        /// The offending path.
        path: StorePath,
        /// Underlying decode error.
        #[source]
        source: flowgrid_primitive::PrimitiveJsonError,
    },

    /// The top-level JSON value wasn't the object shape the format expects.
    #[error("'{0}': expected a JSON object")]
    NotAnObject(PathBuf),
}

impl ProjectError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProjectError::Io { path: path.into(), source }
    }

    /// Wraps a JSON error with the path that caused it.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ProjectError::Json { path: path.into(), source }
    }
}
