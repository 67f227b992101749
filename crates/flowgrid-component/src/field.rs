//! `Field`: a component leaf wrapping a single store-resident primitive,
//! with a cached copy kept in sync with the store on every commit/refresh.
//!
//! Covers every scalar field kind the original `Core/Field/*` hierarchy
//! defines: `Bool`, `UInt`, `Int`, `Float`, `String`, plus `Enum`/`Flags`,
//! which store an `i32`/`u32` primitive and layer a name table on top —
//! the interpretation lives entirely in the field, not in the store.

use flowgrid_path::{Id, Path};
use flowgrid_primitive::{Primitive, PrimitiveKind};
use flowgrid_store::Store;

use crate::error::ComponentError;
use crate::tree::{ComponentKind, ComponentTree};

/// Which scalar kind a [`Field`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `bool`
    Bool,
    /// `u32`
    UInt,
    /// `i32`
    Int,
    /// `f32`
    Float,
    /// `String`
    StringField,
    /// `i32` interpreted against a name table.
    Enum,
    /// `u32` bitmask interpreted against a name table.
    Flags,
}

impl FieldKind {
    fn primitive_kind(self) -> PrimitiveKind {
        match self {
            FieldKind::Bool => PrimitiveKind::Bool,
            FieldKind::UInt | FieldKind::Flags => PrimitiveKind::UInt,
            FieldKind::Int | FieldKind::Enum => PrimitiveKind::Int,
            FieldKind::Float => PrimitiveKind::Float,
            FieldKind::StringField => PrimitiveKind::String,
        }
    }
}

/// Optional numeric range metadata, used for UI validation by the
/// (out-of-scope) rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Inclusive lower bound.
    pub min: f32,
    /// Inclusive upper bound.
    pub max: f32,
}

/// A component leaf wrapping one primitive value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// This field's component id.
    pub id: Id,
    /// This field's store path.
    pub path: Path,
    /// Which scalar kind this field wraps.
    pub kind: FieldKind,
    /// Optional display format string, e.g. `"%.2f dB"`.
    pub format: Option<String>,
    /// Optional numeric range (ignored for `StringField`).
    pub range: Option<Range>,
    /// Name table for `Enum`/`Flags` fields, indexed by value for `Enum`
    /// and by bit position for `Flags`.
    pub names: Vec<String>,
    cached: Primitive,
}

impl Field {
    /// Constructs a new field under `parent`, registering it in the tree
    /// and, if the store has no entry yet at its path, writing `default`.
    /// Requires an open store transient (construction happens as part of
    /// project setup, which runs inside a transient like any other batch
    /// of store writes).
    pub fn construct(
        tree: &mut ComponentTree,
        store: &mut Store,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        kind: FieldKind,
        default: Primitive,
    ) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Field);
        let path = tree.get(id).expect("just registered").path.clone();
        if !store.contains(&path) {
            store.set(path.clone(), default.clone()).expect("construction runs inside an open transient");
        }
        let cached = store.get(&path).cloned().unwrap_or(default);
        Field { id, path, kind, format: None, range: None, names: Vec::new(), cached }
    }

    /// Removes this field's store entry and tree registration.
    pub fn destruct(self, tree: &mut ComponentTree, store: &mut Store) {
        let _ = store.erase(&self.path);
        tree.unregister(self.id);
    }

    /// The cached value, kept equal to `Store.get(path)` after every commit
    /// and every [`Field::refresh`].
    pub fn cached(&self) -> &Primitive {
        &self.cached
    }

    /// Re-reads the cached value from `store`. Called by the frame loop
    /// after a commit or a history navigation touches this field's path.
    pub fn refresh(&mut self, store: &Store) {
        if let Ok(value) = store.get(&self.path) {
            self.cached = value.clone();
        }
    }

    /// Writes `value` through the store. Requires an open transient and a
    /// value of this field's declared kind.
    pub fn set(&self, store: &mut Store, value: Primitive) -> Result<(), ComponentError> {
        if value.kind() != self.kind.primitive_kind() {
            return Err(ComponentError::KindMismatch { path: self.path.clone(), expected: primitive_kind_name(self.kind.primitive_kind()) });
        }
        store.set(self.path.clone(), value).expect("Field::set requires an open transient");
        Ok(())
    }

    /// Flips a `Bool` field's stored value. Errors if this field isn't
    /// `Bool` — this is the `Bool.Toggle` action's target operation.
    pub fn toggle(&self, store: &mut Store) -> Result<(), ComponentError> {
        let current = match store.get(&self.path) {
            Ok(Primitive::Bool(b)) => *b,
            _ => return Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "bool" }),
        };
        store.set(self.path.clone(), Primitive::Bool(!current)).expect("open transient");
        Ok(())
    }

    /// The cached value as a `bool`. Errors if this field isn't `Bool`.
    pub fn as_bool(&self) -> Result<bool, ComponentError> {
        match &self.cached {
            Primitive::Bool(b) => Ok(*b),
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "bool" }),
        }
    }

    /// The cached value as an `i32`. Valid for `Int` and `Enum` fields.
    pub fn as_i32(&self) -> Result<i32, ComponentError> {
        match &self.cached {
            Primitive::Int(i) => Ok(*i),
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "i32" }),
        }
    }

    /// The cached value as a `u32`. Valid for `UInt` and `Flags` fields.
    pub fn as_u32(&self) -> Result<u32, ComponentError> {
        match &self.cached {
            Primitive::UInt(u) => Ok(*u),
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "u32" }),
        }
    }

    /// The cached value as an `f32`.
    pub fn as_f32(&self) -> Result<f32, ComponentError> {
        match &self.cached {
            Primitive::Float(f) => Ok(*f),
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "f32" }),
        }
    }

    /// The cached value as a string slice.
    pub fn as_str(&self) -> Result<&str, ComponentError> {
        match &self.cached {
            Primitive::String(s) => Ok(s.as_str()),
            _ => Err(ComponentError::KindMismatch { path: self.path.clone(), expected: "string" }),
        }
    }

    /// For an `Enum` field, the name of the currently-selected variant.
    pub fn enum_name(&self) -> Result<&str, ComponentError> {
        let index = self.as_i32()?;
        self.names
            .get(usize::try_from(index).unwrap_or(usize::MAX))
            .map(String::as_str)
            .ok_or(ComponentError::KindMismatch { path: self.path.clone(), expected: "enum index in range" })
    }

    /// For a `Flags` field, the names of every currently-set bit.
    pub fn flag_names(&self) -> Result<Vec<&str>, ComponentError> {
        let bits = self.as_u32()?;
        Ok(self
            .names
            .iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << i) != 0)
            .map(|(_, name)| name.as_str())
            .collect())
    }
}

fn primitive_kind_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::Int => "i32",
        PrimitiveKind::UInt => "u32",
        PrimitiveKind::Float => "f32",
        PrimitiveKind::String => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ComponentTree, Store, Id) {
        let mut tree = ComponentTree::new();
        let mut store = Store::new();
        store.begin_transient();
        let root = tree.register_root("App");
        (tree, store, root)
    }

    #[test]
    fn construct_writes_default_when_absent() {
        let (mut tree, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "gain", "Gain", FieldKind::Float, Primitive::Float(1.0));
        assert_eq!(field.as_f32().unwrap(), 1.0);
        assert_eq!(*store.get(&Path::from("/gain")).unwrap(), Primitive::Float(1.0));
    }

    #[test]
    fn cached_equals_store_after_refresh() {
        let (mut tree, mut store, root) = setup();
        let mut field = Field::construct(&mut tree, &mut store, root, "gain", "Gain", FieldKind::Float, Primitive::Float(1.0));
        store.set(field.path.clone(), Primitive::Float(2.0)).unwrap();
        field.refresh(&store);
        assert_eq!(field.as_f32().unwrap(), 2.0);
    }

    #[test]
    fn destruct_erases_store_entry() {
        let (mut tree, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "gain", "Gain", FieldKind::Float, Primitive::Float(1.0));
        let path = field.path.clone();
        field.destruct(&mut tree, &mut store);
        assert!(!store.contains(&path));
        assert!(tree.id_at(&path).is_none());
    }

    #[test]
    fn enum_name_resolves_against_name_table() {
        let (mut tree, mut store, root) = setup();
        let mut field = Field::construct(&mut tree, &mut store, root, "mode", "Mode", FieldKind::Enum, Primitive::Int(1));
        field.names = vec!["Off".into(), "On".into(), "Auto".into()];
        assert_eq!(field.enum_name().unwrap(), "On");
    }

    #[test]
    fn flag_names_resolves_set_bits() {
        let (mut tree, mut store, root) = setup();
        let mut field = Field::construct(&mut tree, &mut store, root, "flags", "Flags", FieldKind::Flags, Primitive::UInt(0b101));
        field.names = vec!["A".into(), "B".into(), "C".into()];
        assert_eq!(field.flag_names().unwrap(), vec!["A", "C"]);
    }

    #[test]
    fn toggle_flips_bool_field() {
        let (mut tree, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "enabled", "Enabled", FieldKind::Bool, Primitive::Bool(false));
        field.toggle(&mut store).unwrap();
        assert_eq!(*store.get(&field.path).unwrap(), Primitive::Bool(true));
        field.toggle(&mut store).unwrap();
        assert_eq!(*store.get(&field.path).unwrap(), Primitive::Bool(false));
    }

    #[test]
    fn set_rejects_mismatched_kind() {
        let (mut tree, mut store, root) = setup();
        let field = Field::construct(&mut tree, &mut store, root, "gain", "Gain", FieldKind::Float, Primitive::Float(1.0));
        let err = field.set(&mut store, Primitive::Bool(true)).unwrap_err();
        assert!(matches!(err, ComponentError::KindMismatch { .. }));
    }
}
