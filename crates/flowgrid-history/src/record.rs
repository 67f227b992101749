//! A single entry in the history: the store snapshot after some gesture
//! committed, plus the gesture itself.

use flowgrid_store::Store;

use crate::gesture::{Gesture, Timestamp};

/// One slot in the history's record list. `records[0]` is always the
/// project's initial snapshot, with an empty gesture.
#[derive(Clone)]
pub struct HistoryRecord {
    /// When this record was committed.
    pub time: Timestamp,
    /// The store snapshot as of this record.
    pub store: Store,
    /// The merged gesture that produced this record from its predecessor.
    pub gesture: Gesture,
}

impl HistoryRecord {
    /// The initial record: `store` with no prior gesture.
    pub fn initial(store: Store) -> Self {
        HistoryRecord { time: 0, store, gesture: Gesture::empty() }
    }
}
