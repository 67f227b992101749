//! Compile-time-ish metadata describing an action type: its path leaf,
//! display name, menu placement, keyboard shortcut, and merge policy.

use serde::{Deserialize, Serialize};

/// How two adjacent actions of the same type combine when the gesture
/// engine compresses the active gesture before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergePolicy {
    /// Never combines with a prior action of the same type.
    NoMerge,
    /// Any two adjacent actions of this type merge to the later one.
    Merge,
    /// Two adjacent actions of this type on the same target path merge to
    /// the later one.
    SamePathMerge,
    /// The action type supplies its own merge logic (see
    /// [`crate::Action::custom_merge`]).
    Custom,
}

/// A parsed keyboard shortcut: modifier flags plus a key name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    /// Ctrl (or Cmd on macOS) held.
    pub ctrl: bool,
    /// Shift held.
    pub shift: bool,
    /// Alt held.
    pub alt: bool,
    /// The non-modifier key, e.g. `"Z"`.
    pub key: String,
}

impl Shortcut {
    /// Parses a `"Ctrl+Shift+Z"`-style shortcut string.
    pub fn parse(s: &str) -> Self {
        let mut shortcut = Shortcut { ctrl: false, shift: false, alt: false, key: String::new() };
        for part in s.split('+') {
            match part {
                "Ctrl" | "Cmd" => shortcut.ctrl = true,
                "Shift" => shortcut.shift = true,
                "Alt" => shortcut.alt = true,
                key => shortcut.key = key.to_string(),
            }
        }
        shortcut
    }
}

/// Metadata for one action type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The final path segment this action's type is registered under, e.g.
    /// `"Toggle"` for `Bool.Toggle`.
    pub path_leaf: &'static str,
    /// Human-readable name, derived from `path_leaf` if not given explicitly.
    pub name: String,
    /// Menu label, if this action appears in a menu.
    pub menu_label: Option<String>,
    /// Keyboard shortcut, if any.
    pub shortcut: Option<Shortcut>,
    /// Whether this action is eligible for undo and project persistence.
    pub savable: bool,
    /// How adjacent instances of this action type merge.
    pub merge_policy: MergePolicy,
}

impl Metadata {
    /// Builds metadata, parsing `menu_and_shortcut` of the form
    /// `"[~menu]?[@shortcut]"` (either half optional).
    pub fn new(path_leaf: &'static str, savable: bool, merge_policy: MergePolicy, menu_and_shortcut: &str) -> Self {
        let (menu_label, shortcut) = parse_menu_shortcut(menu_and_shortcut);
        Metadata { path_leaf, name: humanize(path_leaf), menu_label, shortcut, savable, merge_policy }
    }
}

fn parse_menu_shortcut(raw: &str) -> (Option<String>, Option<Shortcut>) {
    let (menu_part, shortcut_part) = match raw.split_once('@') {
        Some((menu, shortcut)) => (menu, Some(shortcut)),
        None => (raw, None),
    };
    let menu_label = menu_part.strip_prefix('~').filter(|s| !s.is_empty()).map(str::to_string);
    let shortcut = shortcut_part.filter(|s| !s.is_empty()).map(Shortcut::parse);
    (menu_label, shortcut)
}

fn humanize(leaf: &str) -> String {
    let mut out = String::with_capacity(leaf.len());
    for (i, ch) in leaf.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
