//! `Container`: components holding a collection projected onto the store.
//!
//! Covers every collection kind the original `Core/Container/*` hierarchy
//! defines: an ordered vector, a ragged `Vector2D` (inner rows may differ in
//! length) and the fixed-size `Matrix` (all rows the same length, addressed
//! by row/column rather than a tracked per-row length), a fixed 2-element
//! `Vec2`, a navigable stack, an adjacency set of id pairs, and a thin
//! text-buffer projection (the buffer's own multi-cursor/undo logic lives in
//! `flowgrid-text`; this container only tracks the store-resident string).
//!
//! Every variant keeps its own length/cursor bookkeeping as ordinary store
//! entries beside its elements (e.g. a vector's length lives at its own
//! path) rather than in a separate in-memory cache, so a project reload
//! that replays a patch through the store reconstructs container state for
//! free.

use flowgrid_path::{Id, Path};
use flowgrid_primitive::{Primitive, PrimitiveKind};
use flowgrid_store::{AdjacencyPair, AdjacencySet as StoreAdjacencySet, Store};

use crate::error::ComponentError;
use crate::tree::{ComponentKind, ComponentTree};

fn len_path(base: &Path) -> Path {
    base.append("__len")
}

fn read_len(store: &Store, base: &Path) -> usize {
    match store.get(&len_path(base)) {
        Ok(Primitive::UInt(n)) => *n as usize,
        _ => 0,
    }
}

fn write_len(store: &mut Store, base: &Path, len: usize) {
    store.set(len_path(base), Primitive::UInt(len as u32)).expect("container mutation requires an open transient");
}

/// An ordered, resizable collection of same-kind primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vector {
    /// Component id.
    pub id: Id,
    /// Container path; elements live at `{path}/{index}`.
    pub path: Path,
    /// The kind every element must have.
    pub element_kind: PrimitiveKind,
}

impl Vector {
    /// Registers a new empty vector container under `parent`.
    pub fn construct(
        tree: &mut ComponentTree,
        store: &mut Store,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
    ) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Container);
        let path = tree.get(id).expect("just registered").path.clone();
        if !store.contains(&len_path(&path)) {
            write_len(store, &path, 0);
        }
        Vector { id, path, element_kind }
    }

    /// Current element count.
    pub fn len(&self, store: &Store) -> usize {
        read_len(store, &self.path)
    }

    /// True if the vector has no elements.
    pub fn is_empty(&self, store: &Store) -> bool {
        self.len(store) == 0
    }

    /// The element at `index`.
    pub fn get(&self, store: &Store, index: usize) -> Result<Primitive, ComponentError> {
        store
            .get(&self.path.append_index(index))
            .cloned()
            .map_err(|_| ComponentError::NotFound(self.path.append_index(index)))
    }

    /// Inserts `value` at `index`, shifting later elements up by one.
    pub fn insert(&self, store: &mut Store, index: usize, value: Primitive) {
        let len = self.len(store);
        for i in (index..len).rev() {
            let moved = self.get(store, i).expect("index within bounds");
            store.set(self.path.append_index(i + 1), moved).expect("open transient");
        }
        store.set(self.path.append_index(index), value).expect("open transient");
        write_len(store, &self.path, len + 1);
    }

    /// Removes the element at `index`, shifting later elements down by one.
    pub fn erase(&self, store: &mut Store, index: usize) {
        let len = self.len(store);
        if index >= len {
            return;
        }
        for i in index..len - 1 {
            let moved = self.get(store, i + 1).expect("index within bounds");
            store.set(self.path.append_index(i), moved).expect("open transient");
        }
        store.erase(&self.path.append_index(len - 1)).expect("open transient");
        write_len(store, &self.path, len - 1);
    }

    /// Replaces the element at `index` in place.
    pub fn set(&self, store: &mut Store, index: usize, value: Primitive) {
        store.set(self.path.append_index(index), value).expect("open transient");
    }

    /// Replaces the vector's entire contents (the `Vector.Set` action).
    pub fn replace_all(&self, store: &mut Store, values: &[Primitive]) {
        let old_len = self.len(store);
        for i in values.len()..old_len {
            store.erase(&self.path.append_index(i)).expect("open transient");
        }
        for (i, value) in values.iter().enumerate() {
            store.set(self.path.append_index(i), value.clone()).expect("open transient");
        }
        write_len(store, &self.path, values.len());
    }

    /// Swaps the element at `index` with the one before it.
    pub fn move_up(&self, store: &mut Store, index: usize) {
        if index == 0 {
            return;
        }
        self.swap(store, index - 1, index);
    }

    /// Swaps the element at `index` with the one after it.
    pub fn move_down(&self, store: &mut Store, index: usize) {
        let len = self.len(store);
        if index + 1 < len {
            self.swap(store, index, index + 1);
        }
    }

    /// Drops every element beyond `new_len`.
    pub fn truncate(&self, store: &mut Store, new_len: usize) {
        let len = self.len(store);
        for i in new_len..len {
            store.erase(&self.path.append_index(i)).expect("open transient");
        }
        if new_len < len {
            write_len(store, &self.path, new_len);
        }
    }

    fn swap(&self, store: &mut Store, a: usize, b: usize) {
        let va = self.get(store, a).expect("index within bounds");
        let vb = self.get(store, b).expect("index within bounds");
        store.set(self.path.append_index(a), vb).expect("open transient");
        store.set(self.path.append_index(b), va).expect("open transient");
    }
}

/// A fixed-size 2-element float pair, e.g. a 2-D position. A specialization
/// of the ordered vector at a fixed arity of two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vec2 {
    /// Component id.
    pub id: Id,
    /// Container path; components live at `{path}/0` and `{path}/1`.
    pub path: Path,
}

impl Vec2 {
    /// Registers a new `Vec2` container, defaulting to `(0.0, 0.0)`.
    pub fn construct(tree: &mut ComponentTree, store: &mut Store, parent: Id, path_segment: &str, name: impl Into<String>) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Container);
        let path = tree.get(id).expect("just registered").path.clone();
        for i in 0..2 {
            if !store.contains(&path.append_index(i)) {
                store.set(path.append_index(i), Primitive::Float(0.0)).expect("open transient");
            }
        }
        Vec2 { id, path }
    }

    /// The current `(x, y)` pair.
    pub fn get(&self, store: &Store) -> (f32, f32) {
        let x = store.get(&self.path.append_index(0)).ok().and_then(as_f32).unwrap_or(0.0);
        let y = store.get(&self.path.append_index(1)).ok().and_then(as_f32).unwrap_or(0.0);
        (x, y)
    }

    /// Sets both components.
    pub fn set(&self, store: &mut Store, x: f32, y: f32) {
        store.set(self.path.append_index(0), Primitive::Float(x)).expect("open transient");
        store.set(self.path.append_index(1), Primitive::Float(y)).expect("open transient");
    }
}

fn as_f32(p: &Primitive) -> Option<f32> {
    match p {
        Primitive::Float(f) => Some(*f),
        _ => None,
    }
}

/// A 2-D grid of same-kind primitives, addressed `(row, col)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    /// Component id.
    pub id: Id,
    /// Container path; cells live at `{path}/{row}/{col}`.
    pub path: Path,
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub cols: usize,
    /// Element kind.
    pub element_kind: PrimitiveKind,
}

impl Matrix {
    /// Registers a fixed `rows x cols` matrix, filling every cell with
    /// `default` if absent.
    pub fn construct(
        tree: &mut ComponentTree,
        store: &mut Store,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        rows: usize,
        cols: usize,
        element_kind: PrimitiveKind,
        default: Primitive,
    ) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Container);
        let path = tree.get(id).expect("just registered").path.clone();
        for r in 0..rows {
            for c in 0..cols {
                let cell = path.append_index(r).append_index(c);
                if !store.contains(&cell) {
                    store.set(cell, default.clone()).expect("open transient");
                }
            }
        }
        Matrix { id, path, rows, cols, element_kind }
    }

    /// The cell at `(row, col)`.
    pub fn get(&self, store: &Store, row: usize, col: usize) -> Result<Primitive, ComponentError> {
        let cell = self.path.append_index(row).append_index(col);
        store.get(&cell).cloned().map_err(|_| ComponentError::NotFound(cell))
    }

    /// Writes `value` into the cell at `(row, col)`.
    pub fn set(&self, store: &mut Store, row: usize, col: usize, value: Primitive) {
        let cell = self.path.append_index(row).append_index(col);
        store.set(cell, value).expect("open transient");
    }
}

/// A ragged 2-D vector of same-kind primitives, addressed `{path}/{row}/
/// {col}`. Unlike [`Matrix`], rows may differ in length: each row's own
/// length is tracked at `{path}/{row}/__len` alongside the outer row count
/// at `{path}/__len`, the same length-tracking convention [`Vector`] uses
/// for its flat element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vector2D {
    /// Component id.
    pub id: Id,
    /// Container path.
    pub path: Path,
    /// The kind every element must have.
    pub element_kind: PrimitiveKind,
}

impl Vector2D {
    /// Registers a new, empty ragged 2-D vector.
    pub fn construct(
        tree: &mut ComponentTree,
        store: &mut Store,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
    ) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Container);
        let path = tree.get(id).expect("just registered").path.clone();
        if !store.contains(&len_path(&path)) {
            write_len(store, &path, 0);
        }
        Vector2D { id, path, element_kind }
    }

    /// Number of rows.
    pub fn row_count(&self, store: &Store) -> usize {
        read_len(store, &self.path)
    }

    /// Length of the row at `row`.
    pub fn row_len(&self, store: &Store, row: usize) -> usize {
        read_len(store, &self.path.append_index(row))
    }

    /// The cell at `(row, col)`.
    pub fn get(&self, store: &Store, row: usize, col: usize) -> Result<Primitive, ComponentError> {
        let cell = self.path.append_index(row).append_index(col);
        store.get(&cell).cloned().map_err(|_| ComponentError::NotFound(cell))
    }

    fn clear_row(&self, store: &mut Store, row: usize) {
        let len = self.row_len(store, row);
        for c in 0..len {
            store.erase(&self.path.append_index(row).append_index(c)).expect("open transient");
        }
        let _ = store.erase(&len_path(&self.path.append_index(row)));
    }

    fn write_row(&self, store: &mut Store, row: usize, values: &[Primitive]) {
        for (c, value) in values.iter().enumerate() {
            store.set(self.path.append_index(row).append_index(c), value.clone()).expect("open transient");
        }
        write_len(store, &self.path.append_index(row), values.len());
    }

    /// Writes a single cell in place, without changing row/column counts.
    pub fn set_cell(&self, store: &mut Store, row: usize, col: usize, value: Primitive) {
        store.set(self.path.append_index(row).append_index(col), value).expect("open transient");
    }

    /// Inserts a new row at `index`, shifting later rows down by one.
    pub fn insert_row(&self, store: &mut Store, index: usize, values: &[Primitive]) {
        let rows = self.row_count(store);
        for r in (index..rows).rev() {
            let len = self.row_len(store, r);
            let moved: Vec<Primitive> = (0..len).map(|c| self.get(store, r, c).expect("index within bounds")).collect();
            self.clear_row(store, r + 1);
            self.write_row(store, r + 1, &moved);
        }
        self.clear_row(store, index);
        self.write_row(store, index, values);
        write_len(store, &self.path, rows + 1);
    }

    /// Removes the row at `index`, shifting later rows up by one.
    pub fn erase_row(&self, store: &mut Store, index: usize) {
        let rows = self.row_count(store);
        if index >= rows {
            return;
        }
        for r in index..rows - 1 {
            let len = self.row_len(store, r + 1);
            let moved: Vec<Primitive> =
                (0..len).map(|c| self.get(store, r + 1, c).expect("index within bounds")).collect();
            self.clear_row(store, r);
            self.write_row(store, r, &moved);
        }
        self.clear_row(store, rows - 1);
        write_len(store, &self.path, rows - 1);
    }

    /// Replaces the entire contents, row by row (the `Vector2D.Set` action).
    /// Rows need not share a length.
    pub fn replace_all(&self, store: &mut Store, rows: &[Vec<Primitive>]) {
        let old_rows = self.row_count(store);
        for r in rows.len()..old_rows {
            self.clear_row(store, r);
        }
        for (r, row) in rows.iter().enumerate() {
            self.clear_row(store, r);
            self.write_row(store, r, row);
        }
        write_len(store, &self.path, rows.len());
    }
}

/// A vector of navigable history-like entries with a current-index cursor
/// (e.g. a breadcrumb or tab stack). Distinct from the project's
/// `History` (`flowgrid-history`), which tracks store snapshots rather
/// than an arbitrary ordered list of primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigableStack {
    /// Component id.
    pub id: Id,
    /// Container path; entries live at `{path}/{index}`, the cursor at
    /// `{path}/__current`.
    pub path: Path,
    inner: Vector,
}

impl NavigableStack {
    /// Registers a new, empty navigable stack.
    pub fn construct(
        tree: &mut ComponentTree,
        store: &mut Store,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
    ) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Container);
        let path = tree.get(id).expect("just registered").path.clone();
        let inner = Vector { id, path: path.clone(), element_kind };
        if !store.contains(&len_path(&path)) {
            write_len(store, &path, 0);
        }
        if !store.contains(&path.append("__current")) {
            store.set(path.append("__current"), Primitive::Int(-1)).expect("open transient");
        }
        NavigableStack { id, path, inner }
    }

    /// Number of entries.
    pub fn len(&self, store: &Store) -> usize {
        self.inner.len(store)
    }

    /// The kind every entry must have.
    pub fn element_kind(&self) -> PrimitiveKind {
        self.inner.element_kind
    }

    /// The currently-selected index, or `None` if the stack is empty or
    /// the cursor is unset.
    pub fn current_index(&self, store: &Store) -> Option<usize> {
        match store.get(&self.path.append("__current")) {
            Ok(Primitive::Int(i)) if *i >= 0 => Some(*i as usize),
            _ => None,
        }
    }

    /// Pushes a new entry and selects it.
    pub fn push(&self, store: &mut Store, value: Primitive) {
        let len = self.inner.len(store);
        self.inner.insert(store, len, value);
        store.set(self.path.append("__current"), Primitive::Int(len as i32)).expect("open transient");
    }

    /// Removes the top entry, moving the cursor to the new top (or
    /// unsetting it if the stack becomes empty).
    pub fn pop(&self, store: &mut Store) {
        let len = self.inner.len(store);
        if len == 0 {
            return;
        }
        self.inner.erase(store, len - 1);
        let new_top = if len > 1 { (len - 2) as i32 } else { -1 };
        store.set(self.path.append("__current"), Primitive::Int(new_top)).expect("open transient");
    }

    /// Moves the cursor to `index` without changing the stack's contents.
    pub fn navigate_to(&self, store: &mut Store, index: usize) {
        if index < self.inner.len(store) {
            store.set(self.path.append("__current"), Primitive::Int(index as i32)).expect("open transient");
        }
    }
}

/// A set of id-pair edges (e.g. audio graph connections), backed by the
/// store's adjacency side map rather than indexed scalar entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyList {
    /// Component id.
    pub id: Id,
    /// Container path.
    pub path: Path,
}

impl AdjacencyList {
    /// Registers a new, empty adjacency container.
    pub fn construct(tree: &mut ComponentTree, store: &mut Store, parent: Id, path_segment: &str, name: impl Into<String>) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Container);
        let path = tree.get(id).expect("just registered").path.clone();
        AdjacencyList { id, path }
    }

    /// The current edge set.
    pub fn edges(&self, store: &Store) -> StoreAdjacencySet {
        store.adjacency(&self.path)
    }

    /// Adds an edge, if not already present.
    pub fn connect(&self, store: &mut Store, from: Id, to: Id) {
        let mut edges = store.adjacency(&self.path);
        edges.insert((from, to));
        store.set_adjacency(self.path.clone(), edges).expect("open transient");
    }

    /// Removes an edge, if present.
    pub fn disconnect(&self, store: &mut Store, from: Id, to: Id) {
        let mut edges = store.adjacency(&self.path);
        edges.remove(&(from, to));
        store.set_adjacency(self.path.clone(), edges).expect("open transient");
    }

    /// Adds the edge if absent, removes it if present.
    pub fn toggle(&self, store: &mut Store, from: Id, to: Id) {
        let pair: AdjacencyPair = (from, to);
        let mut edges = store.adjacency(&self.path);
        if edges.remove(&pair).is_none() {
            edges.insert(pair);
        }
        store.set_adjacency(self.path.clone(), edges).expect("open transient");
    }
}

/// A thin projection of a store-resident string. The richer multi-cursor,
/// undo, and incremental-reparse behavior of an actual text editor lives in
/// `flowgrid-text`'s `TextEditor`, which is keyed by the same path and
/// syncs its plain-text contents back into this field on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    /// Component id.
    pub id: Id,
    /// The store path holding the buffer's flattened text.
    pub path: Path,
}

impl TextBuffer {
    /// Registers a new text buffer, defaulting to an empty string.
    pub fn construct(tree: &mut ComponentTree, store: &mut Store, parent: Id, path_segment: &str, name: impl Into<String>) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Field);
        let path = tree.get(id).expect("just registered").path.clone();
        if !store.contains(&path) {
            store.set(path.clone(), Primitive::String(String::new())).expect("open transient");
        }
        TextBuffer { id, path }
    }

    /// The buffer's current text.
    pub fn text<'s>(&self, store: &'s Store) -> &'s str {
        match store.get(&self.path) {
            Ok(Primitive::String(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Replaces the buffer's entire contents.
    pub fn set_text(&self, store: &mut Store, text: impl Into<String>) {
        store.set(self.path.clone(), Primitive::String(text.into())).expect("open transient");
    }
}

fn visible_path(base: &Path) -> Path {
    base.append("__visible")
}

/// A window: a group node with a store-resident visibility flag. The rest
/// of a window's placement (position, size, docking) is ordinary child
/// `Field`/`Vec2` state under the same path; `Window` only owns the flag
/// that `Windows.ToggleVisible` targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Component id.
    pub id: Id,
    /// Window path.
    pub path: Path,
}

impl Window {
    /// Registers a new window, defaulting its visibility to `default_visible`.
    pub fn construct(
        tree: &mut ComponentTree,
        store: &mut Store,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        default_visible: bool,
    ) -> Self {
        let id = tree.register(parent, path_segment, name, ComponentKind::Window);
        let path = tree.get(id).expect("just registered").path.clone();
        if !store.contains(&visible_path(&path)) {
            store.set(visible_path(&path), Primitive::Bool(default_visible)).expect("open transient");
        }
        Window { id, path }
    }

    /// Whether the window is currently visible.
    pub fn is_visible(&self, store: &Store) -> bool {
        matches!(store.get(&visible_path(&self.path)), Ok(Primitive::Bool(true)))
    }

    /// Sets the visibility flag directly.
    pub fn set_visible(&self, store: &mut Store, visible: bool) {
        store.set(visible_path(&self.path), Primitive::Bool(visible)).expect("open transient");
    }

    /// Flips the visibility flag (the `Windows.ToggleVisible` action).
    pub fn toggle(&self, store: &mut Store) {
        let visible = self.is_visible(store);
        self.set_visible(store, !visible);
    }
}
