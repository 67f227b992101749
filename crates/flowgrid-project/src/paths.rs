//! Distinguished on-disk locations: the internal project directory, the
//! empty/default project paths it holds, and extension-based format
//! dispatch.

use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// Application name used for the preferences directory.
const APP_NAME: &str = "flowgrid";

/// Literal name of the internal project directory, created under the
/// working directory.
const INTERNAL_DIR_NAME: &str = ".flowgrid";

/// File name for the distinguished empty-project snapshot.
const EMPTY_PROJECT_FILE: &str = "empty.fls";

/// File name for the distinguished default-project action log.
const DEFAULT_PROJECT_FILE: &str = "default.fla";

/// The two on-disk project formats, dispatched by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    /// `.fls`: a full store snapshot.
    Snapshot,
    /// `.fla`: an action log, replayed to reconstruct history.
    ActionLog,
}

/// Resolves the format to use for `path` from its extension.
///
/// # Errors
///
/// Returns [`ProjectError::UnknownExtension`] for any extension other than
/// `fls` or `fla`.
pub fn format_for_extension(path: &Path) -> Result<ProjectFormat, ProjectError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("fls") => Ok(ProjectFormat::Snapshot),
        Some("fla") => Ok(ProjectFormat::ActionLog),
        _ => Err(ProjectError::UnknownExtension(path.to_path_buf())),
    }
}

/// The internal project directory (`.flowgrid`) under `cwd`.
pub fn internal_dir(cwd: &Path) -> PathBuf {
    cwd.join(INTERNAL_DIR_NAME)
}

/// The distinguished empty-project path. Never remembered as a "current
/// project path" even when loaded or saved to.
pub fn empty_project_path(cwd: &Path) -> PathBuf {
    internal_dir(cwd).join(EMPTY_PROJECT_FILE)
}

/// The distinguished default-project path. If present, loaded at startup
/// instead of the empty project.
pub fn default_project_path(cwd: &Path) -> PathBuf {
    internal_dir(cwd).join(DEFAULT_PROJECT_FILE)
}

/// Is `path` one of the two distinguished internal paths (empty or
/// default project)? Such paths are never remembered as the "current
/// project path".
pub fn is_distinguished(path: &Path, cwd: &Path) -> bool {
    path == empty_project_path(cwd) || path == default_project_path(cwd)
}

/// The user-specific preferences directory (`~/.config/flowgrid/` on
/// Linux, and platform equivalents elsewhere), following the same
/// `dirs::config_dir` convention the audio-tooling side of this codebase
/// uses for its own config directory.
pub fn preferences_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME)
}

/// The preferences file path (`<preferences_dir>/preferences.flp`).
pub fn preferences_path() -> PathBuf {
    preferences_dir().join("preferences.flp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_known_extensions() {
        assert_eq!(format_for_extension(Path::new("foo.fls")).unwrap(), ProjectFormat::Snapshot);
        assert_eq!(format_for_extension(Path::new("foo.fla")).unwrap(), ProjectFormat::ActionLog);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = format_for_extension(Path::new("foo.txt")).unwrap_err();
        assert!(matches!(err, ProjectError::UnknownExtension(_)));
    }

    #[test]
    fn distinguished_paths_sit_under_internal_dir() {
        let cwd = Path::new("/home/user/project");
        assert_eq!(empty_project_path(cwd), Path::new("/home/user/project/.flowgrid/empty.fls"));
        assert_eq!(default_project_path(cwd), Path::new("/home/user/project/.flowgrid/default.fla"));
        assert!(is_distinguished(&empty_project_path(cwd), cwd));
        assert!(!is_distinguished(Path::new("/home/user/project/mysong.fls"), cwd));
    }
}
