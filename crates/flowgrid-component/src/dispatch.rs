//! `Apply`/`CanApply` routing: turns a tagged [`Action`] into a store write
//! through whichever field or container owns its target path.
//!
//! The component tree (`tree::ComponentTree`) only tracks topology and
//! metadata; the actual typed instances ([`crate::Field`],
//! [`crate::container::Vector`], …) are registered separately here, keyed
//! by the same [`Id`], because each instance's element/field kind is only
//! known where it was constructed. [`ComponentRegistry`] is that second,
//! behavior-bearing registry; [`apply`] is the spec's "top-level `Apply`".

use flowgrid_action::{
    Action, AdjacencyAction, BoolAction, MatrixAction, NavigableStackAction, TextBufferAction, Vector2DAction,
    VectorAction, WindowsAction,
};
use flowgrid_path::Id;
use flowgrid_primitive::PrimitiveKind;
use flowgrid_store::Store;
use std::collections::HashMap;

use crate::container::{AdjacencyList, Matrix, NavigableStack, TextBuffer, Vec2, Vector, Vector2D, Window};
use crate::error::ComponentError;
use crate::field::{Field, FieldKind};
use crate::tree::ComponentTree;

/// Implemented by every field/container type that can be the target of an
/// [`Action`]: `CanApply` validates, `apply` performs the write.
pub trait ActionTarget: Send {
    /// Whether `action` is valid to apply against this target right now.
    /// Called before `apply`; a `false` result makes the action a dropped
    /// `ValidationFailure` (§7 kind 1) rather than a store mutation.
    fn can_apply(&self, store: &Store, action: &Action) -> bool;

    /// Applies `action`. Only ever called after `can_apply` returned `true`,
    /// so implementations may assume their preconditions hold.
    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError>;
}

impl ActionTarget for Field {
    fn can_apply(&self, _store: &Store, action: &Action) -> bool {
        match action {
            Action::Bool(BoolAction::Toggle { path }) => *path == self.path && self.kind == FieldKind::Bool,
            Action::IntSet(a) => {
                a.path == self.path
                    && matches!(self.kind, FieldKind::Int | FieldKind::Enum)
                    && a.value.kind() == PrimitiveKind::Int
            }
            Action::UIntSet(a) => {
                a.path == self.path
                    && matches!(self.kind, FieldKind::UInt | FieldKind::Flags)
                    && a.value.kind() == PrimitiveKind::UInt
            }
            Action::FloatSet(a) => {
                a.path == self.path && self.kind == FieldKind::Float && a.value.kind() == PrimitiveKind::Float
            }
            Action::StringSet(a) => {
                a.path == self.path && self.kind == FieldKind::StringField && a.value.kind() == PrimitiveKind::String
            }
            _ => false,
        }
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::Bool(BoolAction::Toggle { .. }) => self.toggle(store),
            Action::IntSet(a) | Action::UIntSet(a) | Action::FloatSet(a) | Action::StringSet(a) => {
                self.set(store, a.value.clone())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "an action this field accepts" }),
        }
    }
}

impl ActionTarget for Window {
    fn can_apply(&self, _store: &Store, action: &Action) -> bool {
        matches!(action, Action::Windows(WindowsAction::ToggleVisible { path }) if *path == self.path)
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::Windows(WindowsAction::ToggleVisible { .. }) => {
                self.toggle(store);
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "Windows.ToggleVisible" }),
        }
    }
}

impl ActionTarget for Vector {
    fn can_apply(&self, store: &Store, action: &Action) -> bool {
        let len = self.len(store);
        match action {
            Action::Vector(VectorAction::Insert { path, index, value }) => {
                *path == self.path && *index <= len && value.kind() == self.element_kind
            }
            Action::Vector(VectorAction::Erase { path, index }) => *path == self.path && *index < len,
            Action::Vector(VectorAction::Set { path, values }) => {
                *path == self.path && values.iter().all(|v| v.kind() == self.element_kind)
            }
            Action::Vector(VectorAction::MoveUp { path, index }) => *path == self.path && *index > 0 && *index < len,
            Action::Vector(VectorAction::MoveDown { path, index }) => *path == self.path && index + 1 < len,
            Action::Vector(VectorAction::Truncate { path, len: new_len }) => *path == self.path && *new_len <= len,
            _ => false,
        }
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::Vector(VectorAction::Insert { index, value, .. }) => {
                self.insert(store, *index, value.clone());
                Ok(())
            }
            Action::Vector(VectorAction::Erase { index, .. }) => {
                self.erase(store, *index);
                Ok(())
            }
            Action::Vector(VectorAction::Set { values, .. }) => {
                self.replace_all(store, values);
                Ok(())
            }
            Action::Vector(VectorAction::MoveUp { index, .. }) => {
                self.move_up(store, *index);
                Ok(())
            }
            Action::Vector(VectorAction::MoveDown { index, .. }) => {
                self.move_down(store, *index);
                Ok(())
            }
            Action::Vector(VectorAction::Truncate { len, .. }) => {
                self.truncate(store, *len);
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "a Vector.* action" }),
        }
    }
}

impl ActionTarget for Matrix {
    fn can_apply(&self, _store: &Store, action: &Action) -> bool {
        match action {
            Action::Matrix(MatrixAction::SetValue { path, row, col, value }) => {
                *path == self.path && *row < self.rows && *col < self.cols && value.kind() == self.element_kind
            }
            Action::Matrix(MatrixAction::Set { path, values, cols }) => {
                *path == self.path
                    && *cols == self.cols
                    && values.len() == self.rows * self.cols
                    && values.iter().all(|v| v.kind() == self.element_kind)
            }
            _ => false,
        }
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::Matrix(MatrixAction::SetValue { row, col, value, .. }) => {
                self.set(store, *row, *col, value.clone());
                Ok(())
            }
            Action::Matrix(MatrixAction::Set { values, cols, .. }) => {
                for (i, value) in values.iter().enumerate() {
                    self.set(store, i / cols, i % cols, value.clone());
                }
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "a Matrix.* action" }),
        }
    }
}

impl ActionTarget for Vector2D {
    fn can_apply(&self, store: &Store, action: &Action) -> bool {
        let rows = self.row_count(store);
        match action {
            Action::Vector2D(Vector2DAction::InsertRow { path, index, values }) => {
                *path == self.path && *index <= rows && values.iter().all(|v| v.kind() == self.element_kind)
            }
            Action::Vector2D(Vector2DAction::EraseRow { path, index }) => *path == self.path && *index < rows,
            Action::Vector2D(Vector2DAction::Set { path, rows }) => {
                *path == self.path && rows.iter().all(|row| row.iter().all(|v| v.kind() == self.element_kind))
            }
            _ => false,
        }
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::Vector2D(Vector2DAction::InsertRow { index, values, .. }) => {
                self.insert_row(store, *index, values);
                Ok(())
            }
            Action::Vector2D(Vector2DAction::EraseRow { index, .. }) => {
                self.erase_row(store, *index);
                Ok(())
            }
            Action::Vector2D(Vector2DAction::Set { rows, .. }) => {
                self.replace_all(store, rows);
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "a Vector2D.* action" }),
        }
    }
}

impl ActionTarget for NavigableStack {
    fn can_apply(&self, store: &Store, action: &Action) -> bool {
        let len = self.len(store);
        match action {
            Action::NavigableStack(NavigableStackAction::Push { path, value }) => {
                *path == self.path && value.kind() == self.element_kind()
            }
            Action::NavigableStack(NavigableStackAction::Pop { path }) => *path == self.path && len > 0,
            Action::NavigableStack(NavigableStackAction::MoveTo { path, index }) => *path == self.path && *index < len,
            _ => false,
        }
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::NavigableStack(NavigableStackAction::Push { value, .. }) => {
                self.push(store, value.clone());
                Ok(())
            }
            Action::NavigableStack(NavigableStackAction::Pop { .. }) => {
                self.pop(store);
                Ok(())
            }
            Action::NavigableStack(NavigableStackAction::MoveTo { index, .. }) => {
                self.navigate_to(store, *index);
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "a NavigableStack.* action" }),
        }
    }
}

impl ActionTarget for Vec2 {
    fn can_apply(&self, _store: &Store, action: &Action) -> bool {
        matches!(action, Action::Vec2Set(a) if a.path == self.path)
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::Vec2Set(a) => {
                self.set(store, a.x, a.y);
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "Vec2.Set" }),
        }
    }
}

impl ActionTarget for AdjacencyList {
    fn can_apply(&self, _store: &Store, action: &Action) -> bool {
        match action {
            Action::AdjacencyList(
                AdjacencyAction::Connect { path, .. }
                | AdjacencyAction::Disconnect { path, .. }
                | AdjacencyAction::ToggleConnection { path, .. },
            ) => *path == self.path,
            _ => false,
        }
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::AdjacencyList(AdjacencyAction::Connect { from, to, .. }) => {
                self.connect(store, *from, *to);
                Ok(())
            }
            Action::AdjacencyList(AdjacencyAction::Disconnect { from, to, .. }) => {
                self.disconnect(store, *from, *to);
                Ok(())
            }
            Action::AdjacencyList(AdjacencyAction::ToggleConnection { from, to, .. }) => {
                self.toggle(store, *from, *to);
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "an AdjacencyList.* action" }),
        }
    }
}

impl ActionTarget for TextBuffer {
    fn can_apply(&self, _store: &Store, action: &Action) -> bool {
        matches!(action, Action::TextBuffer(TextBufferAction::SetText { path, .. }) if *path == self.path)
    }

    fn apply(&self, store: &mut Store, action: &Action) -> Result<(), ComponentError> {
        match action {
            Action::TextBuffer(TextBufferAction::SetText { text, .. }) => {
                self.set_text(store, text.clone());
                Ok(())
            }
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "TextBuffer.SetText" }),
        }
    }
}

/// The second, behavior-bearing registry: `{Id -> ActionTarget}`. Populated
/// alongside [`ComponentTree`] during project construction — every field or
/// container registers both its tree node (topology) and, here, its
/// dispatch target (behavior).
#[derive(Default)]
pub struct ComponentRegistry {
    targets: HashMap<Id, Box<dyn ActionTarget>>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target` as the dispatch target for `id`.
    pub fn register(&mut self, id: Id, target: impl ActionTarget + 'static) {
        self.targets.insert(id, Box::new(target));
    }

    /// Removes a target, e.g. during component teardown.
    pub fn unregister(&mut self, id: Id) {
        self.targets.remove(&id);
    }

    /// The target registered at `id`, if any.
    pub fn get(&self, id: Id) -> Option<&dyn ActionTarget> {
        self.targets.get(&id).map(AsRef::as_ref)
    }
}

/// The result of routing one action through [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The action found its target, passed `CanApply`, and was applied.
    Applied,
    /// `CanApply` rejected the action, or its target path resolved to no
    /// registered component — both are §7 kind 1 `ValidationFailure`s: the
    /// action is silently dropped.
    ValidationFailed,
    /// The action has no single component target (`Store.*` history
    /// navigation); the caller (ordinarily the history engine) handles it.
    NotHandled,
}

/// Routes `action` to its target component and applies it, mutating
/// `store` in place. Requires an open transient, as every target's `apply`
/// writes through `Store::set`/`erase`.
///
/// `Action::Patch` is handled here directly rather than through the
/// registry: it already carries the exact ops to write and has no single
/// owning field or container (a bulk container replace may span many
/// paths), so it bypasses per-target validation entirely — the caller that
/// constructed a `PatchApplyAction` is presumed to have computed it
/// correctly.
pub fn apply(registry: &ComponentRegistry, tree: &ComponentTree, store: &mut Store, action: &Action) -> ApplyOutcome {
    if let Action::Patch(patch_action) = action {
        let patch = &patch_action.patch;
        for (relative, op) in &patch.ops {
            let path = patch.base.join(relative);
            match op {
                flowgrid_store::PatchOp::Add { value } | flowgrid_store::PatchOp::Replace { value, .. } => {
                    store.set(path, value.clone()).expect("open transient");
                }
                flowgrid_store::PatchOp::Remove { .. } => {
                    store.erase(&path).expect("open transient");
                }
            }
        }
        return ApplyOutcome::Applied;
    }

    let Some(path) = action.path() else {
        return ApplyOutcome::NotHandled;
    };
    let Ok(node) = tree.find_by_path(path) else {
        return ApplyOutcome::ValidationFailed;
    };
    let Some(target) = registry.get(node.id) else {
        return ApplyOutcome::ValidationFailed;
    };
    if !target.can_apply(store, action) {
        return ApplyOutcome::ValidationFailed;
    }
    target.apply(store, action).expect("can_apply approved this action");
    ApplyOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_action::SetAction;
    use flowgrid_path::Path;
    use flowgrid_primitive::Primitive;
    use flowgrid_store::Store;

    fn setup() -> (ComponentTree, ComponentRegistry, Store, Id) {
        let mut tree = ComponentTree::new();
        let mut store = Store::new();
        store.begin_transient();
        let root = tree.register_root("App");
        (tree, ComponentRegistry::new(), store, root)
    }

    #[test]
    fn toggle_applies_and_flips_value() {
        let (mut tree, mut registry, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "mute", "Mute", FieldKind::Bool, Primitive::Bool(false));
        registry.register(field.id, field.clone());

        let outcome = apply(&registry, &tree, &mut store, &Action::Bool(BoolAction::Toggle { path: Path::from("/mute") }));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(*store.get(&Path::from("/mute")).unwrap(), Primitive::Bool(true));
    }

    #[test]
    fn toggle_twice_cancels_back_to_original_value() {
        let (mut tree, mut registry, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "x", "X", FieldKind::Bool, Primitive::Bool(false));
        registry.register(field.id, field.clone());
        let toggle = Action::Bool(BoolAction::Toggle { path: Path::from("/x") });

        apply(&registry, &tree, &mut store, &toggle);
        apply(&registry, &tree, &mut store, &toggle);
        assert_eq!(*store.get(&Path::from("/x")).unwrap(), Primitive::Bool(false));
    }

    #[test]
    fn mismatched_kind_is_rejected_by_can_apply_and_store_is_unchanged() {
        let (mut tree, mut registry, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "gain", "Gain", FieldKind::Float, Primitive::Float(1.0));
        registry.register(field.id, field.clone());

        let bad = Action::IntSet(SetAction { path: Path::from("/gain"), value: Primitive::Int(5) });
        let outcome = apply(&registry, &tree, &mut store, &bad);
        assert_eq!(outcome, ApplyOutcome::ValidationFailed);
        assert_eq!(*store.get(&Path::from("/gain")).unwrap(), Primitive::Float(1.0));
    }

    #[test]
    fn action_with_no_registered_component_is_a_validation_failure() {
        let (tree, registry, mut store, _root) = setup();
        let action = Action::Bool(BoolAction::Toggle { path: Path::from("/nope") });
        assert_eq!(apply(&registry, &tree, &mut store, &action), ApplyOutcome::ValidationFailed);
    }

    #[test]
    fn matrix_set_value_applies_within_bounds_and_rejects_out_of_bounds() {
        let (mut tree, mut registry, mut store, root) = setup();
        let grid =
            crate::container::Matrix::construct(&mut tree, &mut store, root, "grid", "Grid", 2, 2, PrimitiveKind::Bool, Primitive::Bool(false));
        registry.register(grid.id, grid.clone());

        let ok = Action::Matrix(MatrixAction::SetValue { path: Path::from("/grid"), row: 1, col: 0, value: Primitive::Bool(true) });
        assert_eq!(apply(&registry, &tree, &mut store, &ok), ApplyOutcome::Applied);
        assert_eq!(*store.get(&Path::from("/grid/1/0")).unwrap(), Primitive::Bool(true));

        let oob = Action::Matrix(MatrixAction::SetValue { path: Path::from("/grid"), row: 5, col: 0, value: Primitive::Bool(true) });
        assert_eq!(apply(&registry, &tree, &mut store, &oob), ApplyOutcome::ValidationFailed);
    }

    #[test]
    fn vector2d_insert_row_then_erase_row_applies_through_dispatch() {
        let (mut tree, mut registry, mut store, root) = setup();
        let grid = crate::container::Vector2D::construct(&mut tree, &mut store, root, "grid", "Grid", PrimitiveKind::Int);
        registry.register(grid.id, grid.clone());

        let insert = Action::Vector2D(Vector2DAction::InsertRow {
            path: Path::from("/grid"),
            index: 0,
            values: vec![Primitive::Int(1), Primitive::Int(2)],
        });
        assert_eq!(apply(&registry, &tree, &mut store, &insert), ApplyOutcome::Applied);
        assert_eq!(grid.row_len(&store, 0), 2);

        let erase = Action::Vector2D(Vector2DAction::EraseRow { path: Path::from("/grid"), index: 0 });
        assert_eq!(apply(&registry, &tree, &mut store, &erase), ApplyOutcome::Applied);
        assert_eq!(grid.row_count(&store), 0);
    }

    #[test]
    fn navigable_stack_push_pop_and_move_to_apply_through_dispatch() {
        let (mut tree, mut registry, mut store, root) = setup();
        let stack =
            crate::container::NavigableStack::construct(&mut tree, &mut store, root, "nodes", "Nodes", PrimitiveKind::String);
        registry.register(stack.id, stack.clone());

        let push =
            Action::NavigableStack(NavigableStackAction::Push { path: Path::from("/nodes"), value: Primitive::String("a".into()) });
        assert_eq!(apply(&registry, &tree, &mut store, &push), ApplyOutcome::Applied);
        apply(&registry, &tree, &mut store, &push);
        assert_eq!(stack.current_index(&store), Some(1));

        let move_to = Action::NavigableStack(NavigableStackAction::MoveTo { path: Path::from("/nodes"), index: 0 });
        assert_eq!(apply(&registry, &tree, &mut store, &move_to), ApplyOutcome::Applied);
        assert_eq!(stack.current_index(&store), Some(0));

        let bad_move = Action::NavigableStack(NavigableStackAction::MoveTo { path: Path::from("/nodes"), index: 9 });
        assert_eq!(apply(&registry, &tree, &mut store, &bad_move), ApplyOutcome::ValidationFailed);

        let pop = Action::NavigableStack(NavigableStackAction::Pop { path: Path::from("/nodes") });
        assert_eq!(apply(&registry, &tree, &mut store, &pop), ApplyOutcome::Applied);
        assert_eq!(stack.len(&store), 1);
    }

    #[test]
    fn store_actions_are_not_handled_by_component_dispatch() {
        let (tree, registry, mut store, _root) = setup();
        let action = Action::Store(flowgrid_action::StoreAction::Undo);
        assert_eq!(apply(&registry, &tree, &mut store, &action), ApplyOutcome::NotHandled);
    }
}
