//! Wires the project-state core's crates together into one running
//! session, and defines the collaborator traits (audio device, DSP
//! compiler, UI) the core talks to without depending on any real backend.
//!
//! This crate owns three things the rest of the workspace leaves to a host
//! application: the concrete FlowGrid project tree ([`project_tree`]), the
//! per-frame control flow that drains the action queue and drives
//! store/history/listener updates ([`session`]), and the `flowgrid` CLI
//! binary (`src/main.rs`) that exercises all of it headlessly.

pub mod collab;
pub mod error;
pub mod project_tree;
pub mod registry;
pub mod session;
pub mod shortcuts;

pub use error::AppError;
pub use project_tree::AppTree;
pub use registry::AppRegistry;
pub use session::Session;
pub use shortcuts::ShortcutTable;
