//! The process-wide shortcut table (§4.3): a flat list of
//! `{modifier flags, key} -> Action` bindings, consulted once per frame
//! against the current key state. A match still has to pass `CanApply`
//! like any other action — the table only decides which action a keypress
//! means, not whether it's currently legal.

use flowgrid_action::{Action, BoolAction, Metadata, Shortcut, StoreAction, WindowsAction};

use crate::project_tree::AppTree;

/// A flat shortcut -> action table.
#[derive(Default)]
pub struct ShortcutTable {
    entries: Vec<(Shortcut, Action)>,
}

impl ShortcutTable {
    /// An empty table.
    pub fn new() -> Self {
        ShortcutTable::default()
    }

    /// Binds `shortcut` to `action`. Later registrations for an identical
    /// shortcut shadow earlier ones at lookup time (first match wins, so
    /// callers should register more specific bindings first).
    pub fn register(&mut self, shortcut: Shortcut, action: Action) {
        self.entries.push((shortcut, action));
    }

    /// The action bound to this exact modifier/key combination, if any.
    pub fn resolve(&self, ctrl: bool, shift: bool, alt: bool, key: &str) -> Option<&Action> {
        self.entries
            .iter()
            .find(|(s, _)| s.ctrl == ctrl && s.shift == shift && s.alt == alt && s.key == key)
            .map(|(_, action)| action)
    }
}

/// Builds the default table for `app`: undo/redo from their own action
/// metadata, plus a handful of bindings the menu system doesn't otherwise
/// express (mute and window-visibility toggles have no shortcut baked into
/// their `Metadata`, since that string is empty for every `Bool`/`Windows`
/// action — see `Action::metadata`).
pub fn default_table(app: &AppTree) -> ShortcutTable {
    let mut table = ShortcutTable::new();
    register_from_metadata(&mut table, Action::Store(StoreAction::Undo));
    register_from_metadata(&mut table, Action::Store(StoreAction::Redo));
    table.register(
        Shortcut { ctrl: false, shift: false, alt: false, key: "M".to_string() },
        Action::Bool(BoolAction::Toggle { path: app.mixer.mute.path.clone() }),
    );
    table.register(
        Shortcut { ctrl: true, shift: false, alt: false, key: "1".to_string() },
        Action::Windows(WindowsAction::ToggleVisible { path: app.mixer.window.path.clone() }),
    );
    table.register(
        Shortcut { ctrl: true, shift: false, alt: false, key: "2".to_string() },
        Action::Windows(WindowsAction::ToggleVisible { path: app.editor.window.path.clone() }),
    );
    table
}

fn register_from_metadata(table: &mut ShortcutTable, action: Action) {
    let Metadata { shortcut: Some(shortcut), .. } = action.metadata() else { return };
    table.register(shortcut, action);
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_store::Store;

    fn sample_app() -> AppTree {
        let mut registry = crate::registry::AppRegistry::new();
        let mut store = Store::new();
        store.begin_transient();
        let app = crate::project_tree::construct(&mut registry, &mut store);
        store.commit();
        app
    }

    #[test]
    fn default_table_resolves_undo_and_redo() {
        let table = default_table(&sample_app());
        assert_eq!(table.resolve(true, false, false, "Z"), Some(&Action::Store(StoreAction::Undo)));
        assert_eq!(table.resolve(true, true, false, "Z"), Some(&Action::Store(StoreAction::Redo)));
    }

    #[test]
    fn default_table_resolves_mute_toggle() {
        let app = sample_app();
        let table = default_table(&app);
        let expected = Action::Bool(BoolAction::Toggle { path: app.mixer.mute.path.clone() });
        assert_eq!(table.resolve(false, false, false, "M"), Some(&expected));
    }

    #[test]
    fn unregistered_combination_resolves_to_none() {
        let table = default_table(&sample_app());
        assert_eq!(table.resolve(false, false, true, "Q"), None);
    }
}
