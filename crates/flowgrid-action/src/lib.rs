//! The action protocol: a tagged union of user-triggered edits, each
//! carrying compile-time-ish metadata (display name, menu placement,
//! shortcut, savability, merge policy), plus the bounded queue that
//! collects actions between frames.
//!
//! Dispatch (`Apply`/`CanApply`) is not implemented here: each component
//! family in `flowgrid-component` knows how to apply the actions in its own
//! namespace. This crate owns the data shape and the merge algebra that the
//! history engine's gesture compression (`flowgrid-history`) drives.

mod action;
mod metadata;
mod queue;

pub use action::{
    Action, AdjacencyAction, BoolAction, MergeOutcome, PatchApplyAction, SetAction, StoreAction, TextBufferAction,
    Vec2SetAction, VectorAction, WindowsAction,
};
pub use metadata::{MergePolicy, Metadata, Shortcut};
pub use queue::{ActionQueue, ActionSender, QueueError};
