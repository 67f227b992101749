//! Ties the component tree's topology registry together with the
//! behavior-bearing dispatch registry, and tracks enough per-component
//! kind information to answer "what primitive kind lives at this store
//! path" — the question `flowgrid-project::snapshot` needs to decode a
//! `.fls` file without depending on `flowgrid-component` itself.

use std::collections::HashMap;

use flowgrid_component::{ComponentRegistry, ComponentTree};
use flowgrid_path::{Id, Path};
use flowgrid_primitive::PrimitiveKind;
use flowgrid_project::PathKindResolver;

/// What a registered component contributes to the store's path→kind
/// mapping, beyond its own topology.
#[derive(Debug, Clone, Copy)]
enum KindInfo {
    /// A field's own path holds a value of this kind.
    Field(PrimitiveKind),
    /// A window's `__visible` suffix path holds a `Bool`.
    Window,
    /// A vector's `{index}` and `__len` suffix paths hold this element
    /// kind and `UInt` respectively.
    Vector(PrimitiveKind),
    /// A `Vec2`'s `/0` and `/1` suffix paths hold `Float`s.
    Vec2,
    /// A matrix's `{row}/{col}` and `__len` suffix paths.
    Matrix(PrimitiveKind),
    /// A ragged `Vector2D`'s `{row}/{col}` cells, its own `__len` (row
    /// count), and each row's own `{row}/__len` (that row's length).
    Vector2D(PrimitiveKind),
    /// A navigable stack's inner vector plus `__current` (`UInt`).
    NavigableStack(PrimitiveKind),
    /// A text buffer's own path holds a `String`.
    TextBuffer,
}

/// The process-wide component registry: topology, dispatch targets, and
/// kind bookkeeping for snapshot decoding.
#[derive(Default)]
pub struct AppRegistry {
    pub tree: ComponentTree,
    pub targets: ComponentRegistry,
    kinds: HashMap<Id, KindInfo>,
}

impl AppRegistry {
    /// An empty registry. Callers build the tree by calling
    /// `tree.register_root()` and the various `flowgrid_component`
    /// constructors directly, then record each one's kind here via
    /// [`AppRegistry::note_field`] / [`AppRegistry::note_container`].
    pub fn new() -> Self {
        AppRegistry::default()
    }

    /// Records a field's kind for snapshot decoding.
    pub fn note_field(&mut self, id: Id, kind: PrimitiveKind) {
        self.kinds.insert(id, KindInfo::Field(kind));
    }

    /// Records a window's visibility-flag kind.
    pub fn note_window(&mut self, id: Id) {
        self.kinds.insert(id, KindInfo::Window);
    }

    /// Records a vector's element kind.
    pub fn note_vector(&mut self, id: Id, element_kind: PrimitiveKind) {
        self.kinds.insert(id, KindInfo::Vector(element_kind));
    }

    /// Records a `Vec2`.
    pub fn note_vec2(&mut self, id: Id) {
        self.kinds.insert(id, KindInfo::Vec2);
    }

    /// Records a matrix's element kind.
    pub fn note_matrix(&mut self, id: Id, element_kind: PrimitiveKind) {
        self.kinds.insert(id, KindInfo::Matrix(element_kind));
    }

    /// Records a ragged `Vector2D`'s element kind.
    pub fn note_vector2d(&mut self, id: Id, element_kind: PrimitiveKind) {
        self.kinds.insert(id, KindInfo::Vector2D(element_kind));
    }

    /// Records a navigable stack's element kind.
    pub fn note_navigable_stack(&mut self, id: Id, element_kind: PrimitiveKind) {
        self.kinds.insert(id, KindInfo::NavigableStack(element_kind));
    }

    /// Records a text buffer.
    pub fn note_text_buffer(&mut self, id: Id) {
        self.kinds.insert(id, KindInfo::TextBuffer);
    }
}

impl PathKindResolver for AppRegistry {
    fn kind_at(&self, path: &Path) -> Option<PrimitiveKind> {
        if let Some(id) = self.tree.id_at(path) {
            if let Some(KindInfo::Field(kind)) = self.kinds.get(&id) {
                return Some(*kind);
            }
            if let Some(KindInfo::TextBuffer) = self.kinds.get(&id) {
                return Some(PrimitiveKind::String);
            }
        }

        if let Some(leaf) = path.leaf() {
            if leaf == "__len" {
                let parent = path.parent()?;
                if matches!(
                    self.tree.id_at(&parent).and_then(|id| self.kinds.get(&id)),
                    Some(KindInfo::Vector(_))
                        | Some(KindInfo::Matrix(_))
                        | Some(KindInfo::NavigableStack(_))
                        | Some(KindInfo::Vector2D(_))
                ) {
                    return Some(PrimitiveKind::UInt);
                }
                // A Vector2D row's own length lives at `{path}/{row}/__len`;
                // `{row}` is an unregistered index segment, so check the
                // grandparent (the Vector2D container itself) instead.
                let grandparent = parent.parent()?;
                return matches!(
                    self.tree.id_at(&grandparent).and_then(|id| self.kinds.get(&id)),
                    Some(KindInfo::Vector2D(_))
                )
                .then_some(PrimitiveKind::UInt);
            }
            if leaf == "__visible" {
                let parent = path.parent()?;
                return matches!(self.tree.id_at(&parent).and_then(|id| self.kinds.get(&id)), Some(KindInfo::Window))
                    .then_some(PrimitiveKind::Bool);
            }
            if leaf == "__current" {
                let parent = path.parent()?;
                return matches!(
                    self.tree.id_at(&parent).and_then(|id| self.kinds.get(&id)),
                    Some(KindInfo::NavigableStack(_))
                )
                .then_some(PrimitiveKind::UInt);
            }
        }

        let node = self.tree.find_by_path(path).ok()?;
        match self.kinds.get(&node.id)? {
            KindInfo::Vector(kind)
            | KindInfo::Matrix(kind)
            | KindInfo::Vector2D(kind)
            | KindInfo::NavigableStack(kind) => Some(*kind),
            KindInfo::Vec2 => Some(PrimitiveKind::Float),
            KindInfo::Field(_) | KindInfo::Window | KindInfo::TextBuffer => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_component::{ComponentKind, Vector};
    use flowgrid_store::Store;

    #[test]
    fn resolves_field_kind_by_exact_path() {
        let mut registry = AppRegistry::new();
        let root = registry.tree.register_root("App");
        let id = registry.tree.register(root, "gain", "Gain", ComponentKind::Field);
        registry.note_field(id, PrimitiveKind::Float);
        assert_eq!(registry.kind_at(&Path::from("/gain")), Some(PrimitiveKind::Float));
    }

    #[test]
    fn resolves_vector_element_and_len_kinds() {
        let mut registry = AppRegistry::new();
        let root = registry.tree.register_root("App");
        let mut store = Store::new();
        store.begin_transient();
        let vector = Vector::construct(&mut registry.tree, &mut store, root, "items", "Items", PrimitiveKind::Int);
        store.commit();
        registry.note_vector(vector.id, PrimitiveKind::Int);

        assert_eq!(registry.kind_at(&Path::from("/items/0")), Some(PrimitiveKind::Int));
        assert_eq!(registry.kind_at(&Path::from("/items/__len")), Some(PrimitiveKind::UInt));
    }

    #[test]
    fn resolves_vector2d_cell_outer_len_and_row_len_kinds() {
        use flowgrid_component::Vector2D;

        let mut registry = AppRegistry::new();
        let root = registry.tree.register_root("App");
        let mut store = Store::new();
        store.begin_transient();
        let grid = Vector2D::construct(&mut registry.tree, &mut store, root, "grid", "Grid", PrimitiveKind::Int);
        grid.insert_row(&mut store, 0, &[flowgrid_primitive::Primitive::Int(1)]);
        store.commit();
        registry.note_vector2d(grid.id, PrimitiveKind::Int);

        assert_eq!(registry.kind_at(&Path::from("/grid/0/0")), Some(PrimitiveKind::Int));
        assert_eq!(registry.kind_at(&Path::from("/grid/__len")), Some(PrimitiveKind::UInt));
        assert_eq!(registry.kind_at(&Path::from("/grid/0/__len")), Some(PrimitiveKind::UInt));
    }

    #[test]
    fn unregistered_path_resolves_to_none() {
        let registry = AppRegistry::new();
        assert_eq!(registry.kind_at(&Path::from("/ghost")), None);
    }
}
