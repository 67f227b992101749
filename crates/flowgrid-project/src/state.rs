//! Tracks the bookkeeping around "what project is open and has it
//! changed" that the save/load commands hang off of: the current path (if
//! any), and the has-changes flag.

use std::path::{Path, PathBuf};

/// What a "save current project" request should actually do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Write to this already-known path.
    Path(PathBuf),
    /// No path is known yet; the caller must show a save dialog and ask
    /// again with the chosen path.
    NeedsDialog,
}

/// Open-project bookkeeping: which file (if any) it was loaded from or
/// last saved to, and whether it has unsaved changes.
#[derive(Debug, Clone, Default)]
pub struct ProjectState {
    /// Set only for user-chosen paths — never the distinguished
    /// empty/default project paths.
    current_path: Option<PathBuf>,
    has_changes: bool,
}

impl ProjectState {
    /// A fresh project with no path and no changes.
    pub fn new() -> Self {
        ProjectState::default()
    }

    /// The remembered path, if this project was loaded from or saved to
    /// a user-chosen location.
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Whether any non-empty commit has happened since the last
    /// successful save.
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    /// Call after every non-empty commit (§7: "has changes" flips true on
    /// every non-empty commit).
    pub fn mark_dirty(&mut self) {
        self.has_changes = true;
    }

    /// Call after a successful save, recording `path` as the current
    /// project path unless it's one of the distinguished internal paths.
    pub fn mark_saved(&mut self, path: &Path, cwd: &Path) {
        self.has_changes = false;
        if !crate::paths::is_distinguished(path, cwd) {
            self.current_path = Some(path.to_path_buf());
        }
    }

    /// Call after a successful load, recording `path` the same way
    /// `mark_saved` does, and clearing the has-changes flag (a freshly
    /// loaded project has no unsaved changes).
    pub fn mark_loaded(&mut self, path: &Path, cwd: &Path) {
        self.has_changes = false;
        if !crate::paths::is_distinguished(path, cwd) {
            self.current_path = Some(path.to_path_buf());
        } else {
            self.current_path = None;
        }
    }

    /// Resolves a "save current" request: if a current path is known,
    /// save there; otherwise the caller must show a save dialog (§4.6:
    /// "Save-Current with no current path auto-rewrites to
    /// Show-Save-Dialog").
    pub fn resolve_save_current(&self) -> SaveTarget {
        match &self.current_path {
            Some(path) => SaveTarget::Path(path.clone()),
            None => SaveTarget::NeedsDialog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_project_has_no_path_and_no_changes() {
        let state = ProjectState::new();
        assert_eq!(state.current_path(), None);
        assert!(!state.has_changes());
        assert_eq!(state.resolve_save_current(), SaveTarget::NeedsDialog);
    }

    #[test]
    fn save_current_resolves_to_dialog_without_a_known_path() {
        let state = ProjectState::new();
        assert_eq!(state.resolve_save_current(), SaveTarget::NeedsDialog);
    }

    #[test]
    fn mark_saved_remembers_user_chosen_path() {
        let mut state = ProjectState::new();
        state.mark_dirty();
        let cwd = Path::new("/work");
        state.mark_saved(Path::new("/work/mysong.fls"), cwd);
        assert!(!state.has_changes());
        assert_eq!(state.resolve_save_current(), SaveTarget::Path(PathBuf::from("/work/mysong.fls")));
    }

    #[test]
    fn mark_saved_to_distinguished_path_does_not_set_current_path() {
        let mut state = ProjectState::new();
        let cwd = Path::new("/work");
        state.mark_saved(&crate::paths::empty_project_path(cwd), cwd);
        assert_eq!(state.current_path(), None);
        assert_eq!(state.resolve_save_current(), SaveTarget::NeedsDialog);
    }

    #[test]
    fn mark_dirty_then_mark_saved_clears_flag() {
        let mut state = ProjectState::new();
        state.mark_dirty();
        assert!(state.has_changes());
        state.mark_saved(Path::new("/work/mysong.fls"), Path::new("/work"));
        assert!(!state.has_changes());
    }
}
