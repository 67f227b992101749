//! The component tree, typed fields, and collection containers that project
//! onto the store.
//!
//! `flowgrid-component` owns three things from the spec's §4.1/§4.2/§4.3:
//!
//! - [`tree::ComponentTree`]: the process-wide `{Id -> Component}` and
//!   `{Path -> Id}` registry, built once during project construction.
//! - [`field::Field`] and the [`container`] types: the typed leaves and
//!   collection projections that actually read and write the store.
//! - [`listeners::ListenerRegistry`] and [`dispatch`]: per-batch change
//!   notification and the `Apply`/`CanApply` routing that turns an
//!   [`flowgrid_action::Action`] into store writes through whichever
//!   field or container owns its target path.

pub mod container;
mod error;
pub mod dispatch;
pub mod field;
pub mod listeners;
pub mod tree;

pub use container::{AdjacencyList, Matrix, NavigableStack, TextBuffer, Vec2, Vector, Vector2D, Window};
pub use dispatch::{ActionTarget, ApplyOutcome, ComponentRegistry};
pub use error::ComponentError;
pub use field::{Field, FieldKind, Range};
pub use listeners::{ListenerHandle, ListenerRegistry};
pub use tree::{ComponentKind, ComponentNode, ComponentTree, MenuDescriptor};
