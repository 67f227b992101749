//! The `.flp` preferences format: a small, process-independent JSON blob
//! separate from any one project, holding the recently-opened-paths list.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::paths;

/// Number of entries kept in the recently-opened-paths list.
const MAX_RECENT: usize = 10;

/// User preferences, persisted at [`paths::preferences_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Most-recently-opened project path first.
    #[serde(default)]
    pub recently_opened_paths: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences { recently_opened_paths: Vec::new() }
    }
}

impl Preferences {
    /// Loads preferences from the platform preferences path, falling back
    /// to defaults if the file doesn't exist yet.
    pub fn load() -> Result<Self, ProjectError> {
        Self::load_from(&paths::preferences_path())
    }

    /// Loads preferences from an explicit path (used by tests and by
    /// callers overriding the platform default).
    pub fn load_from(path: &Path) -> Result<Self, ProjectError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| ProjectError::json(path, source))
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(source) => Err(ProjectError::io(path, source)),
        }
    }

    /// Saves preferences to the platform preferences path, creating its
    /// parent directory if needed.
    pub fn save(&self) -> Result<(), ProjectError> {
        self.save_to(&paths::preferences_path())
    }

    /// Saves preferences to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ProjectError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProjectError::io(parent, source))?;
        }
        let json = serde_json::to_string_pretty(self).expect("Preferences has no non-JSON-representable fields");
        fs::write(path, json).map_err(|source| ProjectError::io(path, source))
    }

    /// Records `path` as the most-recently-opened project, moving it to
    /// the front if already present and truncating to [`MAX_RECENT`]
    /// entries.
    pub fn push_recent(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.recently_opened_paths.retain(|existing| existing != &path);
        self.recently_opened_paths.insert(0, path);
        self.recently_opened_paths.truncate(MAX_RECENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("preferences.flp")).unwrap();
        assert!(prefs.recently_opened_paths.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.flp");
        let mut prefs = Preferences::default();
        prefs.push_recent("/a/song.fls");
        prefs.save_to(&path).unwrap();
        let loaded = Preferences::load_from(&path).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn push_recent_moves_existing_entry_to_front() {
        let mut prefs = Preferences::default();
        prefs.push_recent("/a");
        prefs.push_recent("/b");
        prefs.push_recent("/a");
        assert_eq!(prefs.recently_opened_paths, vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn push_recent_truncates_to_max() {
        let mut prefs = Preferences::default();
        for i in 0..(MAX_RECENT + 5) {
            prefs.push_recent(format!("/p{i}"));
        }
        assert_eq!(prefs.recently_opened_paths.len(), MAX_RECENT);
        assert_eq!(prefs.recently_opened_paths[0], format!("/p{}", MAX_RECENT + 4));
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.flp");
        fs::write(&path, "not json").unwrap();
        let err = Preferences::load_from(&path).unwrap_err();
        assert!(matches!(err, ProjectError::Json { .. }));
    }
}
