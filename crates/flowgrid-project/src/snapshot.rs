//! The `.fls` snapshot format: a JSON object that is the direct encoding of
//! the store — keys are `/`-joined paths, values are primitives per
//! `flowgrid_primitive`'s kind-directed JSON codec.
//!
//! Decoding a snapshot needs to know each path's expected [`PrimitiveKind`]
//! up front (a bare JSON string can't tell a `String` apart from a
//! stringified `u32`), which the store itself doesn't track — that's the
//! component tree's job. Callers supply a [`PathKindResolver`] over
//! whatever registry they've built (ordinarily `flowgrid-component`'s
//! `ComponentTree` plus field-kind lookup).

use flowgrid_path::Path as StorePath;
use flowgrid_primitive::PrimitiveKind;
use flowgrid_store::Store;
use serde_json::{Map, Value};

use crate::error::ProjectError;

/// Resolves the primitive kind expected at a given store path. Implemented
/// by whatever owns the component tree; `flowgrid-project` has no
/// dependency on `flowgrid-component` and only sees this trait.
pub trait PathKindResolver {
    /// The kind a value at `path` must decode as, or `None` if no
    /// component is registered there.
    fn kind_at(&self, path: &StorePath) -> Option<PrimitiveKind>;
}

/// Encodes `store`'s full contents as a snapshot JSON object.
pub fn encode(store: &Store) -> Value {
    let mut map = Map::new();
    for (path, value) in store.iter() {
        map.insert(path.to_string(), value.to_json());
    }
    Value::Object(map)
}

/// Decodes a snapshot JSON object into a fresh, committed [`Store`].
///
/// Paths are resolved against `resolver` in the object's key order; the
/// first unresolvable path aborts the whole load (§7 kind 2) rather than
/// producing a partially-populated store.
pub fn decode(json: &Value, resolver: &dyn PathKindResolver) -> Result<Store, ProjectError> {
    let Value::Object(map) = json else {
        return Err(ProjectError::NotAnObject(std::path::PathBuf::new()));
    };
    let mut store = Store::new();
    store.begin_transient();
    for (key, raw) in map {
        let path = StorePath::from(key.as_str());
        let Some(kind) = resolver.kind_at(&path) else {
            tracing::error!(%path, "snapshot load: no component registered at this path");
            return Err(ProjectError::NotFound(path));
        };
        let value = flowgrid_primitive::Primitive::from_json(raw, kind)
            .map_err(|source| ProjectError::Primitive { path: path.clone(), source })?;
        store.set(path, value).expect("freshly begun transient");
    }
    store.commit();
    Ok(store)
}
