//! The `.fla` action-log format: `{ index, gestures: [{actions, time}, ...] }`.
//!
//! This module only owns the wire shape and its JSON codec. Replaying a log
//! into a live project — applying each gesture's actions through the
//! component dispatch, committing, and rebuilding history records — needs
//! the component tree and history engine, which live in other crates;
//! `flowgrid-app` drives that replay using the [`ActionLogFile`] this
//! module decodes.

use flowgrid_action::Action;
use flowgrid_path::Path as StorePath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProjectError;

/// One recorded gesture: its merged actions (each paired with the path it
/// targeted, redundant with the action's own payload but matching the
/// on-disk shape) and the commit timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureEntry {
    /// `(path, action)` pairs, in application order.
    pub actions: Vec<(StorePath, Action)>,
    /// Microseconds since the Unix epoch.
    pub time: i64,
}

/// The full contents of a `.fla` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogFile {
    /// The history index to restore via `SetIndex` after replay.
    pub index: usize,
    /// Every gesture, in commit order.
    pub gestures: Vec<GestureEntry>,
}

impl ActionLogFile {
    /// An empty log: no gestures, index 0.
    pub fn empty() -> Self {
        ActionLogFile { index: 0, gestures: Vec::new() }
    }

    /// Encodes to the on-disk JSON shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).expect("ActionLogFile has no non-JSON-representable fields")
    }

    /// Decodes from the on-disk JSON shape.
    pub fn from_json(json: &Value) -> Result<Self, ProjectError> {
        serde_json::from_value(json.clone()).map_err(|source| ProjectError::json(std::path::PathBuf::new(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_action::{BoolAction, SetAction};
    use flowgrid_primitive::Primitive;

    #[test]
    fn round_trips_through_json() {
        let log = ActionLogFile {
            index: 2,
            gestures: vec![
                GestureEntry {
                    actions: vec![(
                        StorePath::from("/a"),
                        Action::Bool(BoolAction::Toggle { path: StorePath::from("/a") }),
                    )],
                    time: 1000,
                },
                GestureEntry {
                    actions: vec![(
                        StorePath::from("/b/x"),
                        Action::IntSet(SetAction { path: StorePath::from("/b/x"), value: Primitive::Int(5) }),
                    )],
                    time: 2000,
                },
            ],
        };
        let json = log.to_json();
        let back = ActionLogFile::from_json(&json).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn empty_log_has_no_gestures() {
        assert!(ActionLogFile::empty().gestures.is_empty());
    }
}
