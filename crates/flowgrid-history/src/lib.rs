//! Indexed store history: gesture-compressed undo/redo with branch
//! navigation and path-update timelines.
//!
//! Every committed frame's savable actions accumulate into an *active
//! gesture* until it idles past a duration threshold or one of its actions
//! forces an immediate finalize (a bool toggle, for instance). Finalizing
//! runs the actions through [`flowgrid_action::Action::merge`] and, if
//! anything survives, appends a new [`record::HistoryRecord`] holding the
//! post-gesture store snapshot.

mod gesture;
mod history;
mod record;

pub use gesture::{merge_actions, Gesture, Timestamp};
pub use history::{History, PathUpdateTimeline, DEFAULT_GESTURE_DURATION_SEC};
pub use record::HistoryRecord;
