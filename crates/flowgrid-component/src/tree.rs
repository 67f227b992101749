//! The component tree: a process-wide registry of `{Id -> Component}` and
//! `{Path -> Id}`, built once during project construction. Topology is
//! static after construction — only field/container *contents* change at
//! runtime, and those live in the store, not here.

use std::collections::HashMap;

use flowgrid_path::{Id, Path};

use crate::error::ComponentError;

/// What a registered node actually is, beyond its tree bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// A plain grouping node with no store-resident value of its own.
    Group,
    /// A leaf wrapping a single primitive (see `flowgrid-component::field`).
    Field,
    /// A node holding a collection projected onto the store (see
    /// `flowgrid-component::container`).
    Container,
    /// A window: a group node with visibility/placement flags.
    Window,
}

/// Optional menu placement for a component that exposes a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDescriptor {
    /// Menu path, e.g. `"File/Open"`.
    pub label: String,
}

/// A node in the component tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    /// This node's id.
    pub id: Id,
    /// The parent's id, `None` for the root.
    pub parent: Option<Id>,
    /// This node's path.
    pub path: Path,
    /// Display name.
    pub name: String,
    /// Optional help text.
    pub help: Option<String>,
    /// Child ids, in construction order.
    pub children: Vec<Id>,
    /// What kind of node this is.
    pub kind: ComponentKind,
    /// Optional menu descriptor.
    pub menu: Option<MenuDescriptor>,
}

/// The component tree registry.
#[derive(Debug, Default)]
pub struct ComponentTree {
    nodes: HashMap<Id, ComponentNode>,
    by_path: HashMap<Path, Id>,
    root: Option<Id>,
}

impl ComponentTree {
    /// An empty tree with no root registered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the distinguished root node. Must be called exactly once,
    /// before any other registration.
    ///
    /// # Panics
    /// Panics if a root is already registered.
    pub fn register_root(&mut self, name: impl Into<String>) -> Id {
        assert!(self.root.is_none(), "component tree root registered twice");
        let id = Id::root();
        let node = ComponentNode {
            id,
            parent: None,
            path: Path::root(),
            name: name.into(),
            help: None,
            children: Vec::new(),
            kind: ComponentKind::Group,
            menu: None,
        };
        self.nodes.insert(id, node);
        self.by_path.insert(Path::root(), id);
        self.root = Some(id);
        id
    }

    /// Registers a new node as a child of `parent`.
    ///
    /// # Panics
    /// Panics if `parent` is not registered, or if a node already exists at
    /// the resulting path — constructing two components at the same path
    /// is a programmer error, not a recoverable one.
    pub fn register(
        &mut self,
        parent: Id,
        path_segment: &str,
        name: impl Into<String>,
        kind: ComponentKind,
    ) -> Id {
        let parent_node = self.nodes.get(&parent).expect("register: parent not found");
        let name = name.into();
        let id = Id::compute(parent, &name, path_segment);
        let path = parent_node.path.append(path_segment);
        assert!(
            !self.by_path.contains_key(&path),
            "component already registered at path '{path}'"
        );
        let node = ComponentNode {
            id,
            parent: Some(parent),
            path: path.clone(),
            name,
            help: None,
            children: Vec::new(),
            kind,
            menu: None,
        };
        self.nodes.insert(id, node);
        self.by_path.insert(path, id);
        self.nodes.get_mut(&parent).expect("parent disappeared").children.push(id);
        id
    }

    /// Attaches help text to an already-registered node.
    pub fn set_help(&mut self, id: Id, help: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.help = Some(help.into());
        }
    }

    /// Attaches a menu descriptor to an already-registered node.
    pub fn set_menu(&mut self, id: Id, menu: MenuDescriptor) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.menu = Some(menu);
        }
    }

    /// Looks up a node by id.
    pub fn get(&self, id: Id) -> Option<&ComponentNode> {
        self.nodes.get(&id)
    }

    /// The id registered at exactly `path`.
    pub fn id_at(&self, path: &Path) -> Option<Id> {
        self.by_path.get(path).copied()
    }

    /// Looks up a node by path, falling back to the nearest registered
    /// ancestor within two segments if there is no exact match (e.g. a
    /// container-element path like `/list/3` resolving to the `/list`
    /// container).
    pub fn find_by_path(&self, path: &Path) -> Result<&ComponentNode, ComponentError> {
        if let Some(id) = self.by_path.get(path) {
            return Ok(&self.nodes[id]);
        }
        let mut current = path.clone();
        for _ in 0..2 {
            let Some(parent) = current.parent() else { break };
            if let Some(id) = self.by_path.get(&parent) {
                return Ok(&self.nodes[id]);
            }
            current = parent;
        }
        Err(ComponentError::NotFound(path.clone()))
    }

    /// Removes a node and detaches it from its parent's child list. Does
    /// not recurse into children — callers tear down a subtree leaf-first.
    pub fn unregister(&mut self, id: Id) {
        if let Some(node) = self.nodes.remove(&id) {
            self.by_path.remove(&node.path);
            if let Some(parent) = node.parent {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
        }
    }

    /// The root id, if registered.
    pub fn root(&self) -> Option<Id> {
        self.root
    }
}
