//! A gesture: the ordered list of savable actions a user interaction
//! produced, before and after merge compression.

use flowgrid_action::{Action, MergeOutcome};
use serde::{Deserialize, Serialize};

/// Microseconds since the Unix epoch. Callers supply this explicitly rather
/// than the history engine reading a clock itself, so the merge/finalize
/// logic stays deterministic and testable.
pub type Timestamp = i64;

/// A compressed run of actions recorded against one history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Gesture {
    /// The merged actions, each paired with the timestamp it was applied at.
    pub actions: Vec<(Action, Timestamp)>,
}

impl Gesture {
    /// A gesture with no actions.
    pub fn empty() -> Self {
        Gesture { actions: Vec::new() }
    }

    /// True if this gesture merges to nothing.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Compresses a raw action sequence via the merge algebra (`Action::merge`):
/// scan adjacent pairs left to right, collapsing `Cancel`/`Merged` outcomes
/// and restarting the scan at the first unmerged action on `CannotMerge`.
///
/// Idempotent: merging an already-merged gesture returns it unchanged, since
/// no two adjacent actions left in the result can merge further.
pub fn merge_actions(actions: Vec<(Action, Timestamp)>) -> Vec<(Action, Timestamp)> {
    let mut result = Vec::new();
    let mut iter = actions.into_iter();
    let Some(mut current) = iter.next() else {
        return result;
    };
    loop {
        let Some(next) = iter.next() else {
            result.push(current);
            break;
        };
        match current.0.merge(&next.0) {
            MergeOutcome::Cancel => match iter.next() {
                Some(new_current) => current = new_current,
                None => break,
            },
            MergeOutcome::Merged(merged) => current = (*merged, next.1),
            MergeOutcome::CannotMerge => {
                result.push(current);
                current = next;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_action::{BoolAction, SetAction};
    use flowgrid_path::Path;
    use flowgrid_primitive::Primitive;

    fn toggle(path: &str) -> Action {
        Action::Bool(BoolAction::Toggle { path: Path::from(path) })
    }

    fn int_set(path: &str, value: i32) -> Action {
        Action::IntSet(SetAction { path: Path::from(path), value: Primitive::Int(value) })
    }

    #[test]
    fn same_path_toggles_cancel_to_nothing() {
        let merged = merge_actions(vec![(toggle("/a"), 0), (toggle("/a"), 1)]);
        assert!(merged.is_empty());
    }

    #[test]
    fn toggles_on_different_paths_stay_distinct() {
        let merged = merge_actions(vec![(toggle("/a"), 0), (toggle("/b"), 1)]);
        assert_eq!(merged, vec![(toggle("/a"), 0), (toggle("/b"), 1)]);
    }

    #[test]
    fn same_path_merge_collapses_to_last() {
        let merged = merge_actions(vec![
            (int_set("/gain", 1), 0),
            (int_set("/gain", 2), 1),
            (int_set("/gain", 3), 2),
        ]);
        assert_eq!(merged, vec![(int_set("/gain", 3), 2)]);
    }

    #[test]
    fn unrelated_actions_interleave_without_merging() {
        let merged =
            merge_actions(vec![(int_set("/a", 1), 0), (int_set("/b", 1), 1), (int_set("/a", 2), 2)]);
        assert_eq!(merged, vec![(int_set("/a", 1), 0), (int_set("/b", 1), 1), (int_set("/a", 2), 2)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let once = merge_actions(vec![
            (int_set("/gain", 1), 0),
            (int_set("/gain", 2), 1),
            (toggle("/on"), 2),
        ]);
        let twice = merge_actions(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_gesture_merges_to_empty() {
        assert!(merge_actions(Vec::new()).is_empty());
    }
}
