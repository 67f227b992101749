//! Error types for the component tree, fields, and containers.

use flowgrid_path::Path;
use thiserror::Error;

/// Errors that can occur while building or querying the component tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComponentError {
    /// A field or container method was called expecting a different
    /// backing kind than what the store actually held.
    #[error("field at '{path}' expected a {expected} value")]
    KindMismatch {
        /// Field path.
        path: Path,
        /// The kind that was expected.
        expected: &'static str,
    },

    /// Lookup by path found nothing within the registry's search radius.
    #[error("no component registered at or near '{0}'")]
    NotFound(Path),
}
