//! Error types for store operations.

use flowgrid_path::Path;
use thiserror::Error;

/// Errors that can occur while reading or mutating a [`crate::Store`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// `get` or `erase` was called with a path that has no entry.
    #[error("no entry at path '{0}'")]
    NotFound(Path),

    /// `set`/`erase`/`set_adjacency` was called without an open transient.
    #[error("store mutation requires an open transient")]
    NoTransient,
}
