//! The persistent, ordered `Path -> Primitive` store.
//!
//! [`Store`] is the single source of truth for every primitive value in the
//! project. It is backed by [`im::OrdMap`], a structurally-shared persistent
//! map: every commit produces a new logical snapshot that shares unchanged
//! subtrees with its predecessor, so the history engine can hold any number
//! of past snapshots at O(1) cost each rather than deep-copying the whole
//! store per undo step.
//!
//! Mutation only happens inside a *transient*: call [`Store::begin_transient`],
//! make edits with [`Store::set`]/[`Store::erase`], then [`Store::commit`] to
//! finalize and receive the [`Patch`] describing what changed.

mod error;
mod patch;

use std::collections::HashSet;

pub use error::StoreError;
use flowgrid_path::{Id, Path};
use flowgrid_primitive::Primitive;
pub use patch::{Patch, PatchOp};

/// An id pair used by the adjacency container (a component-to-component
/// link, e.g. an audio graph edge).
pub type AdjacencyPair = (Id, Id);

/// A set of id pairs stored at one path, backing the adjacency container.
pub type AdjacencySet = im::OrdSet<AdjacencyPair>;

#[derive(Clone)]
struct Transient {
    before: im::OrdMap<Path, Primitive>,
    before_adjacency: im::OrdMap<Path, AdjacencySet>,
    working: im::OrdMap<Path, Primitive>,
    working_adjacency: im::OrdMap<Path, AdjacencySet>,
}

/// The persistent store. Single-writer: the spec reserves write access to
/// the UI thread, so this type is `Send` but not designed for concurrent
/// mutation from multiple threads at once.
#[derive(Clone)]
pub struct Store {
    current: im::OrdMap<Path, Primitive>,
    adjacency: im::OrdMap<Path, AdjacencySet>,
    transient: Option<Transient>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// An empty store with no open transient.
    pub fn new() -> Self {
        Self { current: im::OrdMap::new(), adjacency: im::OrdMap::new(), transient: None }
    }

    /// The value at `path`, or `NotFound` if absent. Reads the transient's
    /// working copy if a transient is open, otherwise the last committed
    /// snapshot.
    pub fn get(&self, path: &Path) -> Result<&Primitive, StoreError> {
        self.active_map().get(path).ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    /// True if `path` has an entry in the currently active view.
    pub fn contains(&self, path: &Path) -> bool {
        self.active_map().contains_key(path)
    }

    /// Writes `value` at `path`. Requires an open transient.
    pub fn set(&mut self, path: Path, value: Primitive) -> Result<(), StoreError> {
        let transient = self.transient_mut()?;
        transient.working.insert(path, value);
        Ok(())
    }

    /// Removes the entry at `path`, if any. Requires an open transient.
    pub fn erase(&mut self, path: &Path) -> Result<(), StoreError> {
        let transient = self.transient_mut()?;
        transient.working.remove(path);
        Ok(())
    }

    /// The id-pair set stored at `path` (empty if none).
    pub fn adjacency(&self, path: &Path) -> AdjacencySet {
        self.active_adjacency().get(path).cloned().unwrap_or_default()
    }

    /// Replaces the id-pair set stored at `path`. Requires an open transient.
    pub fn set_adjacency(&mut self, path: Path, pairs: AdjacencySet) -> Result<(), StoreError> {
        let transient = self.transient_mut()?;
        transient.working_adjacency.insert(path, pairs);
        Ok(())
    }

    /// Opens the transient builder. Idempotent: a second call while a
    /// transient is already open does nothing, per the spec's "exactly one
    /// transient open at a time" invariant.
    pub fn begin_transient(&mut self) {
        if self.transient.is_none() {
            self.transient = Some(Transient {
                before: self.current.clone(),
                before_adjacency: self.adjacency.clone(),
                working: self.current.clone(),
                working_adjacency: self.adjacency.clone(),
            });
        }
    }

    /// True if a transient builder is currently open.
    pub fn in_transient(&self) -> bool {
        self.transient.is_some()
    }

    /// Finalizes the open transient, publishes the new snapshot, and
    /// returns the patch (rooted at `/`) describing what changed.
    ///
    /// # Panics
    /// Panics if no transient is open; calling `commit` without a matching
    /// `begin_transient` is a programmer error.
    pub fn commit(&mut self) -> Patch {
        let transient = self.transient.take().expect("commit without an open transient");
        let patch = Patch::diff_with_adjacency(
            &transient.before,
            &transient.working,
            &transient.before_adjacency,
            &transient.working_adjacency,
            &Path::root(),
        );
        self.current = transient.working;
        self.adjacency = transient.working_adjacency;
        patch
    }

    /// Like [`Store::commit`], but if the resulting patch is empty, the
    /// transient ends without publishing a new snapshot (no-op edits don't
    /// create a new logical version).
    ///
    /// Emptiness accounts for the adjacency map as well as the primitive
    /// one (see [`Patch::diff_with_adjacency`]): an `AdjacencyList`
    /// connect/disconnect/toggle never touches the primitive map, so a
    /// plain primitive diff alone would call a frame with only such an
    /// edit empty and silently drop it.
    ///
    /// # Panics
    /// Panics if no transient is open.
    pub fn checked_commit(&mut self) -> Patch {
        let transient = self.transient.take().expect("checked_commit without an open transient");
        let patch = Patch::diff_with_adjacency(
            &transient.before,
            &transient.working,
            &transient.before_adjacency,
            &transient.working_adjacency,
            &Path::root(),
        );
        if !patch.is_empty() {
            self.current = transient.working;
            self.adjacency = transient.working_adjacency;
        }
        patch
    }

    /// Diffs two full snapshots, relative to `base`. A pure function: does
    /// not touch `self`'s state.
    pub fn create_patch(before: &Store, after: &Store, base: &Path) -> Patch {
        Patch::diff_with_adjacency(&before.current, &after.current, &before.adjacency, &after.adjacency, base)
    }

    /// Applies a patch (forward or its [`Patch::inverse`]) directly to the
    /// committed snapshot, bypassing the usual transient/diff cycle. Used
    /// by the history engine's `SetIndex` navigation, which already knows
    /// the exact patch to move by.
    ///
    /// # Panics
    /// Panics if a transient is open; navigation never runs mid-gesture.
    pub fn apply_patch(&mut self, patch: &Patch) {
        assert!(!self.in_transient(), "apply_patch while a transient is open");
        let mut current = self.current.clone();
        for (relative, op) in &patch.ops {
            let path = patch.base.join(relative);
            match op {
                PatchOp::Add { value } | PatchOp::Replace { value, .. } => {
                    current.insert(path, value.clone());
                }
                PatchOp::Remove { .. } => {
                    current.remove(&path);
                }
            }
        }
        self.current = current;
    }

    /// All paths currently present, in store order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.active_map().keys()
    }

    /// Iterates `(path, value)` pairs in store order, for serialization.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Primitive)> {
        self.active_map().iter()
    }

    /// Paths touched by `patches`, de-duplicated, in first-seen order.
    /// Used by the history engine to know which fields to refresh after a
    /// navigation or commit.
    pub fn touched_paths(patches: &[&Patch]) -> Vec<Path> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for patch in patches {
            for (relative, _) in &patch.ops {
                let path = patch.base.join(relative);
                if seen.insert(path.clone()) {
                    out.push(path);
                }
            }
        }
        out
    }

    fn active_map(&self) -> &im::OrdMap<Path, Primitive> {
        self.transient.as_ref().map_or(&self.current, |t| &t.working)
    }

    fn active_adjacency(&self) -> &im::OrdMap<Path, AdjacencySet> {
        self.transient.as_ref().map_or(&self.adjacency, |t| &t.working_adjacency)
    }

    fn transient_mut(&mut self) -> Result<&mut Transient, StoreError> {
        self.transient.as_mut().ok_or(StoreError::NoTransient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_requires_open_transient() {
        let mut store = Store::new();
        let err = store.set(Path::from("/a"), Primitive::Bool(true)).unwrap_err();
        assert_eq!(err, StoreError::NoTransient);
    }

    #[test]
    fn commit_publishes_and_returns_patch() {
        let mut store = Store::new();
        store.begin_transient();
        store.set(Path::from("/a"), Primitive::Int(1)).unwrap();
        let patch = store.commit();
        assert!(!store.in_transient());
        assert_eq!(*store.get(&Path::from("/a")).unwrap(), Primitive::Int(1));
        assert_eq!(patch.ops.len(), 1);
    }

    #[test]
    fn begin_transient_is_idempotent() {
        let mut store = Store::new();
        store.begin_transient();
        store.set(Path::from("/a"), Primitive::Int(1)).unwrap();
        store.begin_transient();
        assert_eq!(*store.get(&Path::from("/a")).unwrap(), Primitive::Int(1));
    }

    #[test]
    fn checked_commit_skips_publish_on_empty_patch() {
        let mut store = Store::new();
        store.begin_transient();
        store.set(Path::from("/a"), Primitive::Int(1)).unwrap();
        store.commit();

        store.begin_transient();
        store.set(Path::from("/a"), Primitive::Int(1)).unwrap();
        let patch = store.checked_commit();
        assert!(patch.is_empty());
    }

    #[test]
    fn erase_removes_entry() {
        let mut store = Store::new();
        store.begin_transient();
        store.set(Path::from("/a"), Primitive::Int(1)).unwrap();
        store.commit();

        store.begin_transient();
        store.erase(&Path::from("/a")).unwrap();
        store.commit();
        assert!(!store.contains(&Path::from("/a")));
    }

    #[test]
    fn apply_patch_and_its_inverse_round_trips() {
        let mut store = Store::new();
        store.begin_transient();
        store.set(Path::from("/a"), Primitive::Int(1)).unwrap();
        let patch = store.commit();

        store.apply_patch(&patch.inverse());
        assert!(!store.contains(&Path::from("/a")));
        store.apply_patch(&patch);
        assert_eq!(*store.get(&Path::from("/a")).unwrap(), Primitive::Int(1));
    }

    #[test]
    fn adjacency_roundtrips_through_transient() {
        let mut store = Store::new();
        let pairs: AdjacencySet = im::ordset![(Id(1), Id(2))];
        store.begin_transient();
        store.set_adjacency(Path::from("/graph/edges"), pairs.clone()).unwrap();
        store.commit();
        assert_eq!(store.adjacency(&Path::from("/graph/edges")), pairs);
    }

    #[test]
    fn checked_commit_publishes_adjacency_only_edits() {
        let mut store = Store::new();
        let pairs: AdjacencySet = im::ordset![(Id(1), Id(2))];
        store.begin_transient();
        // No primitive field touched this batch: the diffed patch is
        // empty, but the adjacency edit must still publish.
        store.set_adjacency(Path::from("/graph/edges"), pairs.clone()).unwrap();
        let patch = store.checked_commit();
        assert!(!patch.is_empty());
        assert_eq!(store.adjacency(&Path::from("/graph/edges")), pairs);
    }
}
