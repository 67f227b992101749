//! The tagged action union and its merge rules.

use flowgrid_path::{Id, Path};
use flowgrid_primitive::Primitive;
use flowgrid_store::Patch;
use serde::{Deserialize, Serialize};

use crate::metadata::{MergePolicy, Metadata};

/// `Store.*` actions: history navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreAction {
    /// Step the history index back by one, committing an in-flight gesture
    /// first if one is active.
    Undo,
    /// Step the history index forward by one.
    Redo,
    /// Jump directly to a history index.
    SetHistoryIndex(usize),
}

/// `Bool.*` actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoolAction {
    /// Flip the bool field at `path`. A force-finalize action: applying it
    /// always ends the active gesture even if `GestureDurationSec` hasn't
    /// elapsed.
    Toggle {
        /// Target field path.
        path: Path,
    },
}

/// `Windows.*` actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindowsAction {
    /// Flip a window's visibility flag.
    ToggleVisible {
        /// Target window path.
        path: Path,
    },
}

/// A scalar `Set` action generic over the primitive type, used for
/// `Int.Set`, `UInt.Set`, `Float.Set`, and `String.Set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAction {
    /// Target field path.
    pub path: Path,
    /// The value to write.
    pub value: Primitive,
}

/// `Vec2.Set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vec2SetAction {
    /// Target field path.
    pub path: Path,
    /// New x component.
    pub x: f32,
    /// New y component.
    pub y: f32,
}

/// `Vector.*` container actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VectorAction {
    /// Insert `value` at `index`, shifting later elements up.
    Insert {
        /// Container path.
        path: Path,
        /// Insertion index.
        index: usize,
        /// Value to insert.
        value: Primitive,
    },
    /// Remove the element at `index`.
    Erase {
        /// Container path.
        path: Path,
        /// Index to remove.
        index: usize,
    },
    /// Replace the entire container's contents in one step. Declared with a
    /// `Custom` merge policy that behaves like `SamePathMerge`.
    Set {
        /// Container path.
        path: Path,
        /// New contents, in order.
        values: Vec<Primitive>,
    },
    /// Swap the element at `index` with the one before it.
    MoveUp {
        /// Container path.
        path: Path,
        /// Index to move up.
        index: usize,
    },
    /// Swap the element at `index` with the one after it.
    MoveDown {
        /// Container path.
        path: Path,
        /// Index to move down.
        index: usize,
    },
    /// Drop all elements beyond `len`.
    Truncate {
        /// Container path.
        path: Path,
        /// New length.
        len: usize,
    },
}

/// `Matrix.*` container actions. Unlike [`VectorAction`], row/column counts
/// are fixed at construction; there is no insert/erase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatrixAction {
    /// Write a single cell.
    SetValue {
        /// Container path.
        path: Path,
        /// Target row.
        row: usize,
        /// Target column.
        col: usize,
        /// New cell value.
        value: Primitive,
    },
    /// Replace every cell in one step, row-major, `cols` wide.
    Set {
        /// Container path.
        path: Path,
        /// New contents, row-major.
        values: Vec<Primitive>,
        /// Row width `values` is split on.
        cols: usize,
    },
}

/// `Vector2D.*` container actions: a ragged 2-D vector whose rows may
/// differ in length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Vector2DAction {
    /// Insert a new row at `index`, shifting later rows down.
    InsertRow {
        /// Container path.
        path: Path,
        /// Row insertion index.
        index: usize,
        /// The new row's contents.
        values: Vec<Primitive>,
    },
    /// Remove the row at `index`, shifting later rows up.
    EraseRow {
        /// Container path.
        path: Path,
        /// Row index to remove.
        index: usize,
    },
    /// Replace the entire contents, row by row. Rows need not share a
    /// length. Declared `Custom`, behaves like `SamePathMerge`.
    Set {
        /// Container path.
        path: Path,
        /// New contents, one inner vec per row.
        rows: Vec<Vec<Primitive>>,
    },
}

/// `NavigableStack.*` container actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavigableStackAction {
    /// Push a new entry, selecting it.
    Push {
        /// Container path.
        path: Path,
        /// The entry to push.
        value: Primitive,
    },
    /// Remove the top entry.
    Pop {
        /// Container path.
        path: Path,
    },
    /// Move the cursor to `index` without changing the stack's contents.
    MoveTo {
        /// Container path.
        path: Path,
        /// Index to select.
        index: usize,
    },
}

/// `AdjacencyList.*` actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdjacencyAction {
    /// Add an edge.
    Connect {
        /// Container path.
        path: Path,
        /// Source node id.
        from: Id,
        /// Destination node id.
        to: Id,
    },
    /// Remove an edge.
    Disconnect {
        /// Container path.
        path: Path,
        /// Source node id.
        from: Id,
        /// Destination node id.
        to: Id,
    },
    /// Add the edge if absent, remove it if present.
    ToggleConnection {
        /// Container path.
        path: Path,
        /// Source node id.
        from: Id,
        /// Destination node id.
        to: Id,
    },
}

/// `TextBuffer.*` actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextBufferAction {
    /// Replace the buffer's full contents.
    SetText {
        /// Buffer path.
        path: Path,
        /// New contents.
        text: String,
    },
}

/// The internal `Patch.Apply` action: applies a precomputed patch directly.
/// Used by operations (e.g. a container bulk replace) that already know the
/// exact diff rather than expressing it as a higher-level edit. Declared
/// `Custom`: two adjacent `Patch.Apply`s merge via the patch algebra
/// (`§4.5`) when their bases agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchApplyAction {
    /// The patch to apply.
    pub patch: Patch,
}

/// The full action union. Each namespace groups actions that route to the
/// same family of components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// `Store.*`
    Store(StoreAction),
    /// `Bool.*`
    Bool(BoolAction),
    /// `Windows.*`
    Windows(WindowsAction),
    /// `Int.Set`
    IntSet(SetAction),
    /// `UInt.Set`
    UIntSet(SetAction),
    /// `Float.Set`
    FloatSet(SetAction),
    /// `String.Set`
    StringSet(SetAction),
    /// `Vec2.Set`
    Vec2Set(Vec2SetAction),
    /// `Vector.*`
    Vector(VectorAction),
    /// `Matrix.*`
    Matrix(MatrixAction),
    /// `Vector2D.*`
    Vector2D(Vector2DAction),
    /// `NavigableStack.*`
    NavigableStack(NavigableStackAction),
    /// `AdjacencyList.*`
    AdjacencyList(AdjacencyAction),
    /// `TextBuffer.*`
    TextBuffer(TextBufferAction),
    /// `Patch.Apply`
    Patch(PatchApplyAction),
}

/// The result of trying to merge two adjacent actions.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Both actions cancel out (idempotent pair, e.g. toggle-toggle).
    Cancel,
    /// The pair collapses to a single replacement action.
    Merged(Box<Action>),
    /// The pair cannot be combined; emit the first and continue from the
    /// second.
    CannotMerge,
}

impl Action {
    /// Metadata for this action's type.
    pub fn metadata(&self) -> Metadata {
        match self {
            Action::Store(StoreAction::Undo) => Metadata::new("Undo", false, MergePolicy::NoMerge, "~Edit/Undo@Ctrl+Z"),
            Action::Store(StoreAction::Redo) => {
                Metadata::new("Redo", false, MergePolicy::NoMerge, "~Edit/Redo@Ctrl+Shift+Z")
            }
            Action::Store(StoreAction::SetHistoryIndex(_)) => {
                Metadata::new("SetHistoryIndex", false, MergePolicy::NoMerge, "")
            }
            Action::Bool(BoolAction::Toggle { .. }) => Metadata::new("Toggle", true, MergePolicy::Custom, ""),
            Action::Windows(WindowsAction::ToggleVisible { .. }) => {
                Metadata::new("ToggleVisible", true, MergePolicy::NoMerge, "")
            }
            Action::IntSet(_) | Action::UIntSet(_) | Action::FloatSet(_) | Action::StringSet(_) => {
                Metadata::new("Set", true, MergePolicy::SamePathMerge, "")
            }
            Action::Vec2Set(_) => Metadata::new("Set", true, MergePolicy::SamePathMerge, ""),
            Action::Vector(VectorAction::Set { .. }) => Metadata::new("Set", true, MergePolicy::Custom, ""),
            Action::Vector(VectorAction::Insert { .. }) => Metadata::new("Insert", true, MergePolicy::NoMerge, ""),
            Action::Vector(VectorAction::Erase { .. }) => Metadata::new("Erase", true, MergePolicy::NoMerge, ""),
            Action::Vector(VectorAction::MoveUp { .. }) => Metadata::new("MoveUp", true, MergePolicy::NoMerge, ""),
            Action::Vector(VectorAction::MoveDown { .. }) => Metadata::new("MoveDown", true, MergePolicy::NoMerge, ""),
            Action::Vector(VectorAction::Truncate { .. }) => Metadata::new("Truncate", true, MergePolicy::NoMerge, ""),
            Action::Matrix(MatrixAction::SetValue { .. }) => Metadata::new("SetValue", true, MergePolicy::SamePathMerge, ""),
            Action::Matrix(MatrixAction::Set { .. }) => Metadata::new("Set", true, MergePolicy::Custom, ""),
            Action::Vector2D(Vector2DAction::InsertRow { .. }) => {
                Metadata::new("InsertRow", true, MergePolicy::NoMerge, "")
            }
            Action::Vector2D(Vector2DAction::EraseRow { .. }) => {
                Metadata::new("EraseRow", true, MergePolicy::NoMerge, "")
            }
            Action::Vector2D(Vector2DAction::Set { .. }) => Metadata::new("Set", true, MergePolicy::Custom, ""),
            Action::NavigableStack(NavigableStackAction::Push { .. }) => {
                Metadata::new("Push", true, MergePolicy::NoMerge, "")
            }
            Action::NavigableStack(NavigableStackAction::Pop { .. }) => {
                Metadata::new("Pop", true, MergePolicy::NoMerge, "")
            }
            Action::NavigableStack(NavigableStackAction::MoveTo { .. }) => {
                Metadata::new("MoveTo", true, MergePolicy::NoMerge, "")
            }
            Action::AdjacencyList(AdjacencyAction::Connect { .. }) => {
                Metadata::new("Connect", true, MergePolicy::NoMerge, "")
            }
            Action::AdjacencyList(AdjacencyAction::Disconnect { .. }) => {
                Metadata::new("Disconnect", true, MergePolicy::NoMerge, "")
            }
            Action::AdjacencyList(AdjacencyAction::ToggleConnection { .. }) => {
                Metadata::new("ToggleConnection", true, MergePolicy::Custom, "")
            }
            Action::TextBuffer(_) => Metadata::new("SetText", true, MergePolicy::SamePathMerge, ""),
            Action::Patch(_) => Metadata::new("Apply", true, MergePolicy::Custom, ""),
        }
    }

    /// The target path, for path-addressed actions. `None` for actions like
    /// `Undo`/`Redo` that have no single target.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Action::Store(_) => None,
            Action::Bool(BoolAction::Toggle { path })
            | Action::Windows(WindowsAction::ToggleVisible { path })
            | Action::Vector(
                VectorAction::Insert { path, .. }
                | VectorAction::Erase { path, .. }
                | VectorAction::Set { path, .. }
                | VectorAction::MoveUp { path, .. }
                | VectorAction::MoveDown { path, .. }
                | VectorAction::Truncate { path, .. },
            )
            | Action::Matrix(MatrixAction::SetValue { path, .. } | MatrixAction::Set { path, .. })
            | Action::Vector2D(
                Vector2DAction::InsertRow { path, .. }
                | Vector2DAction::EraseRow { path, .. }
                | Vector2DAction::Set { path, .. },
            )
            | Action::NavigableStack(
                NavigableStackAction::Push { path, .. }
                | NavigableStackAction::Pop { path }
                | NavigableStackAction::MoveTo { path, .. },
            )
            | Action::AdjacencyList(
                AdjacencyAction::Connect { path, .. }
                | AdjacencyAction::Disconnect { path, .. }
                | AdjacencyAction::ToggleConnection { path, .. },
            )
            | Action::TextBuffer(TextBufferAction::SetText { path, .. }) => Some(path),
            Action::IntSet(a) | Action::UIntSet(a) | Action::FloatSet(a) | Action::StringSet(a) => Some(&a.path),
            Action::Vec2Set(a) => Some(&a.path),
            Action::Patch(a) => Some(&a.patch.base),
        }
    }

    /// Whether this action is eligible for undo and project persistence.
    pub fn is_savable(&self) -> bool {
        self.metadata().savable
    }

    /// Whether applying this action should force-finalize the active
    /// gesture regardless of elapsed time. Every discrete, non-draggable
    /// action forces finalize (toggles, set-membership edits, adjacency
    /// edits, patch application); the continuous drag-style actions
    /// (scalar/vec2 sets, `Vector.Set`, text edits) coalesce instead and
    /// wait for the idle timeout.
    pub fn forces_finalize(&self) -> bool {
        matches!(
            self,
            Action::Bool(BoolAction::Toggle { .. })
                | Action::Windows(WindowsAction::ToggleVisible { .. })
                | Action::AdjacencyList(_)
                | Action::Vector(
                    VectorAction::Insert { .. }
                        | VectorAction::Erase { .. }
                        | VectorAction::MoveUp { .. }
                        | VectorAction::MoveDown { .. }
                        | VectorAction::Truncate { .. }
                )
                | Action::Vector2D(Vector2DAction::InsertRow { .. } | Vector2DAction::EraseRow { .. })
                | Action::NavigableStack(
                    NavigableStackAction::Push { .. }
                        | NavigableStackAction::Pop { .. }
                        | NavigableStackAction::MoveTo { .. }
                )
                | Action::Patch(_)
        )
    }

    /// Tries to merge `self` followed by `other`, per the declared merge
    /// policy. Mismatched action kinds never merge.
    pub fn merge(&self, other: &Action) -> MergeOutcome {
        match self.metadata().merge_policy {
            MergePolicy::NoMerge => MergeOutcome::CannotMerge,
            MergePolicy::Merge => {
                if std::mem::discriminant(self) == std::mem::discriminant(other) {
                    MergeOutcome::Merged(Box::new(other.clone()))
                } else {
                    MergeOutcome::CannotMerge
                }
            }
            MergePolicy::SamePathMerge => {
                if std::mem::discriminant(self) == std::mem::discriminant(other) && self.path() == other.path() {
                    MergeOutcome::Merged(Box::new(other.clone()))
                } else {
                    MergeOutcome::CannotMerge
                }
            }
            MergePolicy::Custom => self.custom_merge(other),
        }
    }

    /// Custom merge logic for the action types that declare
    /// `MergePolicy::Custom`: `Patch.Apply` (merges via the patch algebra),
    /// `Vector.Set`/`Matrix.Set`/`Vector2D.Set` (each merges like
    /// `SamePathMerge`), and the two toggle-shaped actions, `Bool.Toggle`
    /// and `AdjacencyList.ToggleConnection`, which cancel out when the same
    /// target flips twice in one gesture.
    fn custom_merge(&self, other: &Action) -> MergeOutcome {
        match (self, other) {
            (Action::Patch(a), Action::Patch(b)) => match a.patch.merge(&b.patch) {
                Some(merged) if merged.is_empty() => MergeOutcome::Cancel,
                Some(merged) => MergeOutcome::Merged(Box::new(Action::Patch(PatchApplyAction { patch: merged }))),
                None => MergeOutcome::CannotMerge,
            },
            (Action::Vector(VectorAction::Set { path: ap, .. }), Action::Vector(VectorAction::Set { path: bp, .. }))
                if ap == bp =>
            {
                MergeOutcome::Merged(Box::new(other.clone()))
            }
            (Action::Matrix(MatrixAction::Set { path: ap, .. }), Action::Matrix(MatrixAction::Set { path: bp, .. }))
                if ap == bp =>
            {
                MergeOutcome::Merged(Box::new(other.clone()))
            }
            (
                Action::Vector2D(Vector2DAction::Set { path: ap, .. }),
                Action::Vector2D(Vector2DAction::Set { path: bp, .. }),
            ) if ap == bp => MergeOutcome::Merged(Box::new(other.clone())),
            (Action::Bool(BoolAction::Toggle { path: ap }), Action::Bool(BoolAction::Toggle { path: bp }))
                if ap == bp =>
            {
                MergeOutcome::Cancel
            }
            (
                Action::AdjacencyList(AdjacencyAction::ToggleConnection { path: ap, from: af, to: at }),
                Action::AdjacencyList(AdjacencyAction::ToggleConnection { path: bp, from: bf, to: bt }),
            ) if ap == bp && af == bf && at == bt => MergeOutcome::Cancel,
            _ => MergeOutcome::CannotMerge,
        }
    }
}
