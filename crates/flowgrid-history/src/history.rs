//! The history engine: an indexed list of store snapshots connected by
//! merged gestures, with undo/redo/branch navigation and path-update
//! timelines for "what changed recently" queries.

use flowgrid_action::Action;
use flowgrid_path::Path;
use flowgrid_store::{Patch, Store};

use crate::gesture::{self, Gesture, Timestamp};
use crate::record::HistoryRecord;

/// How long an active gesture can sit idle before the next frame's
/// finalize check commits it, absent a force-finalize action. Matches the
/// `GestureDurationSec` constant from the action merge rules.
pub const DEFAULT_GESTURE_DURATION_SEC: f64 = 0.75;

/// `(path, timestamp)` pairs recording when a path last changed, used by
/// the UI to highlight recently-touched fields.
pub type PathUpdateTimeline = Vec<(Path, Timestamp)>;

/// The history engine. Owns the full record list and the in-progress
/// gesture that hasn't yet been merged into one.
pub struct History {
    records: Vec<HistoryRecord>,
    current: usize,
    active_gesture: Vec<(Action, Timestamp)>,
    committed_timeline: PathUpdateTimeline,
    active_timeline: PathUpdateTimeline,
    gesture_duration_us: i64,
}

impl History {
    /// A fresh history rooted at `initial_store`, with `records[0]` holding
    /// it and no committed gestures yet.
    pub fn new(initial_store: Store) -> Self {
        History {
            records: vec![HistoryRecord::initial(initial_store)],
            current: 0,
            active_gesture: Vec::new(),
            committed_timeline: Vec::new(),
            active_timeline: Vec::new(),
            gesture_duration_us: (DEFAULT_GESTURE_DURATION_SEC * 1_000_000.0) as i64,
        }
    }

    /// Overrides the idle-duration threshold, in microseconds. Exposed for
    /// tests; production code uses [`DEFAULT_GESTURE_DURATION_SEC`].
    pub fn with_gesture_duration_us(mut self, micros: i64) -> Self {
        self.gesture_duration_us = micros;
        self
    }

    /// The store snapshot at the current index.
    pub fn current_store(&self) -> &Store {
        &self.records[self.current].store
    }

    /// The current index into the record list.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of records, including the initial one.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Every record, including the initial one at index 0. Used by project
    /// I/O to encode the `.fla` action-log format: one gesture entry per
    /// record past the initial.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// True if there are no committed gestures beyond the initial record.
    pub fn is_empty(&self) -> bool {
        self.records.len() <= 1
    }

    /// True if a gesture is currently accumulating, not yet finalized.
    pub fn is_mid_gesture(&self) -> bool {
        !self.active_gesture.is_empty()
    }

    /// Paths touched by committed gestures, most-recent timestamp per path.
    pub fn committed_timeline(&self) -> &[(Path, Timestamp)] {
        &self.committed_timeline
    }

    /// Paths touched by the in-progress gesture, not yet committed.
    pub fn active_timeline(&self) -> &[(Path, Timestamp)] {
        &self.active_timeline
    }

    /// Called once per frame, after the store's per-frame batch commit.
    /// `applied` is every action the frame dispatched, in order; `patch` is
    /// the store's resulting commit patch (possibly empty); `now` is the
    /// frame's timestamp; `store` is the store as of right after that
    /// commit. If `patch` is empty the frame contributes nothing: an empty
    /// net store change (e.g. a toggle immediately re-toggled within the
    /// same batch) never touches the gesture or the history.
    pub fn observe_frame(&mut self, applied: &[Action], patch: &Patch, now: Timestamp, store: &Store) {
        if patch.is_empty() {
            return;
        }
        for action in applied.iter().filter(|a| a.is_savable()) {
            self.active_gesture.push((action.clone(), now));
            if let Some(path) = action.path() {
                self.active_timeline.push((path.clone(), now));
            }
        }
        if self.active_gesture.is_empty() {
            return;
        }
        let forces = applied.iter().any(Action::forces_finalize);
        let elapsed = self.active_gesture[0].1 + self.gesture_duration_us <= now;
        if forces || elapsed {
            self.finalize(now, store);
        }
    }

    /// Forces whatever gesture is currently accumulating to finalize now,
    /// regardless of elapsed time. Used before saving a project, so the
    /// persisted action log doesn't lose an in-progress edit.
    pub fn flush(&mut self, now: Timestamp, store: &Store) {
        self.finalize(now, store);
    }

    fn finalize(&mut self, now: Timestamp, store: &Store) {
        if self.active_gesture.is_empty() {
            return;
        }
        let merged = gesture::merge_actions(std::mem::take(&mut self.active_gesture));
        self.active_timeline.clear();
        if merged.is_empty() {
            // Boundary: an empty gesture never produces a history record.
            return;
        }
        let last_ts = merged.last().map_or(now, |(_, t)| *t);
        self.records.truncate(self.current + 1);
        for (action, _) in &merged {
            if let Some(path) = action.path() {
                self.committed_timeline.push((path.clone(), last_ts));
            }
        }
        self.records.push(HistoryRecord { time: last_ts, store: store.clone(), gesture: Gesture { actions: merged } });
        self.current += 1;
    }

    /// Discards the in-progress gesture and reverts `store` to the last
    /// committed snapshot, without touching the record list.
    pub fn discard_active_gesture(&mut self, store: &mut Store) {
        self.active_gesture.clear();
        self.active_timeline.clear();
        *store = self.records[self.current].store.clone();
    }

    /// Steps the history index back by one. At the end of the record list, a
    /// non-empty active gesture commits first (so it becomes
    /// undoable/redoable in its own right), then the index steps back past
    /// it — net effect, the store reverts to its pre-gesture value while the
    /// gesture's result remains reachable via `redo`. Mid-stack (the index
    /// already points somewhere before the end, e.g. after a prior `undo` or
    /// `set_index`), committing would truncate the existing redo branch, so
    /// the active gesture is discarded instead of committed. Returns the
    /// patch moving `store` from its old to new value, for the caller to
    /// refresh fields and fire listeners from.
    pub fn undo(&mut self, store: &mut Store, now: Timestamp) -> Patch {
        let before = store.clone();
        if !self.active_gesture.is_empty() {
            if self.current == self.records.len() - 1 {
                self.finalize(now, store);
            } else {
                self.discard_active_gesture(store);
            }
        }
        if self.current > 0 {
            let leaving = &self.records[self.current];
            for _ in &leaving.gesture.actions {
                self.committed_timeline.pop();
            }
            self.current -= 1;
            *store = self.records[self.current].store.clone();
        }
        Store::create_patch(&before, store, &Path::root())
    }

    /// Steps the history index forward by one, if possible.
    pub fn redo(&mut self, store: &mut Store) -> Patch {
        let before = store.clone();
        if self.current + 1 < self.records.len() {
            self.current += 1;
            let entered = &self.records[self.current];
            for (action, _) in &entered.gesture.actions {
                if let Some(path) = action.path() {
                    self.committed_timeline.push((path.clone(), entered.time));
                }
            }
            *store = self.records[self.current].store.clone();
        }
        Store::create_patch(&before, store, &Path::root())
    }

    /// Jumps directly to `target`, clamped to the valid record range. If a
    /// gesture is mid-flight, it is discarded (not committed) before
    /// navigating — an explicit jump abandons in-progress work rather than
    /// preserving it as a redo branch.
    pub fn set_index(&mut self, target: usize, store: &mut Store) -> Patch {
        let before = store.clone();
        if !self.active_gesture.is_empty() {
            self.discard_active_gesture(store);
        }
        let target = target.min(self.records.len() - 1);
        if target > self.current {
            for i in self.current..target {
                let entered = &self.records[i + 1];
                for (action, _) in &entered.gesture.actions {
                    if let Some(path) = action.path() {
                        self.committed_timeline.push((path.clone(), entered.time));
                    }
                }
            }
        } else if target < self.current {
            for i in (target..self.current).rev() {
                for _ in &self.records[i + 1].gesture.actions {
                    self.committed_timeline.pop();
                }
            }
        }
        self.current = target;
        *store = self.records[self.current].store.clone();
        Store::create_patch(&before, store, &Path::root())
    }

    /// Resets the whole history to a single initial record, discarding
    /// every prior record and the active gesture. Used when loading a
    /// `.fls` snapshot: the loaded state becomes the new record 0.
    pub fn reset(&mut self, store: Store) {
        self.records = vec![HistoryRecord::initial(store)];
        self.current = 0;
        self.active_gesture.clear();
        self.committed_timeline.clear();
        self.active_timeline.clear();
    }

    /// Appends a fully-formed record without running it through the merge
    /// algebra, used when replaying a `.fla` action log: each gesture in
    /// the log is already merged, so it's appended verbatim after the
    /// actions are replayed into `store_snapshot`.
    pub fn append_record_without_merge(&mut self, store_snapshot: Store, gesture: Gesture, time: Timestamp) {
        self.records.truncate(self.current + 1);
        for (action, _) in &gesture.actions {
            if let Some(path) = action.path() {
                self.committed_timeline.push((path.clone(), time));
            }
        }
        self.records.push(HistoryRecord { time, store: store_snapshot, gesture });
        self.current += 1;
    }
}
