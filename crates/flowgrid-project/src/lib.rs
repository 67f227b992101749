//! Project serialization for FlowGrid: the `.fls` snapshot and `.fla`
//! action-log file formats, the `.flp` preferences format, and the
//! distinguished on-disk paths (internal project directory, empty and
//! default projects) that the save/load commands resolve against.
//!
//! This crate knows nothing about the component tree or history engine —
//! decoding a snapshot needs a [`snapshot::PathKindResolver`] supplied by
//! the caller, and replaying an action log is the caller's job too. Both
//! live in `flowgrid-app`, which does depend on `flowgrid-component` and
//! `flowgrid-history`.

pub mod action_log;
pub mod error;
pub mod paths;
pub mod preferences;
pub mod snapshot;
pub mod state;

pub use action_log::{ActionLogFile, GestureEntry};
pub use error::ProjectError;
pub use paths::{
    default_project_path, empty_project_path, format_for_extension, internal_dir, is_distinguished,
    preferences_dir, preferences_path, ProjectFormat,
};
pub use preferences::Preferences;
pub use snapshot::PathKindResolver;
pub use state::{ProjectState, SaveTarget};
