//! Per-batch change notification.
//!
//! Any component may register a callback keyed on the [`Id`] of any other
//! component. When a batch's patch is applied, every id touched by the
//! patch — plus every ancestor id up to the root — is added to that batch's
//! *changed set*; listeners registered on any member of the changed set are
//! invoked once at the end of the batch, regardless of how many paths under
//! them changed or how many times a listener's own id reappears via a
//! listener cycle (§9: "listeners fire at most once per batch regardless of
//! chain length").

use std::collections::HashSet;

use flowgrid_path::{Id, Path};

use crate::tree::ComponentTree;

/// An opaque handle to a registered listener, returned so callers can later
/// deregister it (e.g. when the component holding the callback is torn
/// down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

struct Entry {
    handle: ListenerHandle,
    callback: Box<dyn FnMut() + Send>,
}

/// Registry of `{Id -> [callback]}` change listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    by_id: std::collections::HashMap<Id, Vec<Entry>>,
    next_handle: u64,
}

impl ListenerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to fire whenever `watched` is in a batch's
    /// changed set.
    pub fn register(&mut self, watched: Id, callback: impl FnMut() + Send + 'static) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle);
        self.next_handle += 1;
        self.by_id.entry(watched).or_default().push(Entry { handle, callback: Box::new(callback) });
        handle
    }

    /// Removes a previously registered listener, if it still exists.
    pub fn unregister(&mut self, watched: Id, handle: ListenerHandle) {
        if let Some(entries) = self.by_id.get_mut(&watched) {
            entries.retain(|entry| entry.handle != handle);
        }
    }

    /// Computes the changed set for one batch — every id directly touched by
    /// `touched_paths` plus every ancestor up to the root — and fires each
    /// listener registered on a member of that set exactly once.
    ///
    /// Paths with no registered component (or only a found-by-prefix
    /// ancestor) still contribute whatever ancestor id `tree` can resolve;
    /// paths that resolve to nothing are silently skipped, since an action
    /// that reached this point without touching a real component is not this
    /// registry's concern.
    pub fn notify(&mut self, tree: &ComponentTree, touched_paths: &[Path]) {
        let mut changed = HashSet::new();
        for path in touched_paths {
            let Ok(node) = tree.find_by_path(path) else { continue };
            let mut current = Some(node.id);
            while let Some(id) = current {
                if !changed.insert(id) {
                    break;
                }
                current = tree.get(id).and_then(|n| n.parent);
            }
        }
        let mut fired = HashSet::new();
        for id in changed {
            let Some(entries) = self.by_id.get_mut(&id) else { continue };
            for entry in entries {
                if fired.insert(entry.handle) {
                    (entry.callback)();
                }
            }
        }
    }
}
