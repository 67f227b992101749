//! Ties every crate together into one running project: the store, history,
//! action queue, listener registry, and component tree, plus the per-frame
//! control flow described by the core's concurrency model.

use std::fs;
use std::path::Path as FsPath;

use flowgrid_action::{Action, ActionQueue, ActionSender, QueueError, StoreAction};
use flowgrid_component::{ApplyOutcome, ListenerRegistry};
use flowgrid_history::{Gesture, History, Timestamp};
use flowgrid_project::{snapshot, ActionLogFile, GestureEntry, ProjectError, ProjectState};
use flowgrid_store::Store;

use crate::project_tree::{self, AppTree};
use crate::registry::AppRegistry;

/// Bounded action queue capacity. Generous relative to one frame's expected
/// input volume; a full queue means the UI thread has fallen behind, which
/// surfaces as a dropped `QueueError::Full` rather than unbounded growth.
const QUEUE_CAPACITY: usize = 1024;

/// A running FlowGrid project: topology, store, history, and the queue that
/// feeds them.
pub struct Session {
    store: Store,
    history: History,
    queue: ActionQueue,
    listeners: ListenerRegistry,
    registry: AppRegistry,
    app: AppTree,
    project_state: ProjectState,
}

impl Session {
    /// A fresh session with the default project tree and no unsaved changes.
    pub fn new() -> Self {
        let mut registry = AppRegistry::new();
        let mut store = Store::new();
        store.begin_transient();
        let app = project_tree::construct(&mut registry, &mut store);
        store.commit();

        Session {
            history: History::new(store.clone()),
            store,
            queue: ActionQueue::new(QUEUE_CAPACITY),
            listeners: ListenerRegistry::new(),
            registry,
            app,
            project_state: ProjectState::new(),
        }
    }

    /// Decodes a `.fls` snapshot into a fresh session against this project's
    /// fixed topology.
    ///
    /// # Errors
    /// Returns [`ProjectError`] if the file can't be read, isn't valid JSON,
    /// or names a path this tree doesn't recognize (§7 kind 2).
    pub fn load_snapshot(path: &FsPath, cwd: &FsPath) -> Result<Self, ProjectError> {
        let text = fs::read_to_string(path).map_err(|source| ProjectError::io(path, source))?;
        let json: serde_json::Value = serde_json::from_str(&text).map_err(|source| ProjectError::json(path, source))?;

        let mut registry = AppRegistry::new();
        let mut scratch = Store::new();
        scratch.begin_transient();
        let mut app = project_tree::construct(&mut registry, &mut scratch);
        scratch.commit();

        let store = snapshot::decode(&json, &registry)?;
        app.refresh_all(&store);

        let mut project_state = ProjectState::new();
        project_state.mark_loaded(path, cwd);

        Ok(Session {
            history: History::new(store.clone()),
            store,
            queue: ActionQueue::new(QUEUE_CAPACITY),
            listeners: ListenerRegistry::new(),
            registry,
            app,
            project_state,
        })
    }

    /// Encodes the current store as a `.fls` snapshot and writes it to
    /// `path`. Flushes any in-progress gesture first, so a save never loses
    /// an edit still sitting in the active gesture.
    ///
    /// # Errors
    /// Returns [`ProjectError`] if the file can't be written.
    pub fn save_snapshot(&mut self, path: &FsPath, now: Timestamp, cwd: &FsPath) -> Result<(), ProjectError> {
        self.history.flush(now, &self.store);
        let json = snapshot::encode(&self.store);
        let text = serde_json::to_string_pretty(&json).expect("snapshot JSON is always serializable");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProjectError::io(parent, source))?;
        }
        fs::write(path, text).map_err(|source| ProjectError::io(path, source))?;
        self.project_state.mark_saved(path, cwd);
        Ok(())
    }

    /// Decodes a `.fla` action log and replays it into a fresh session: an
    /// empty project, each gesture's actions applied without going through
    /// the merge/finalize path (they're already merged on disk), appended
    /// to history verbatim, then navigated to the log's recorded index.
    ///
    /// # Errors
    /// Returns [`ProjectError`] if the file can't be read or isn't valid
    /// JSON matching the `.fla` shape.
    pub fn load_action_log(path: &FsPath, cwd: &FsPath) -> Result<Self, ProjectError> {
        let text = fs::read_to_string(path).map_err(|source| ProjectError::io(path, source))?;
        let json: serde_json::Value = serde_json::from_str(&text).map_err(|source| ProjectError::json(path, source))?;
        let log = ActionLogFile::from_json(&json)?;

        let mut registry = AppRegistry::new();
        let mut store = Store::new();
        store.begin_transient();
        let mut app = project_tree::construct(&mut registry, &mut store);
        store.commit();

        let mut history = History::new(store.clone());
        for entry in &log.gestures {
            store.begin_transient();
            for (_, action) in &entry.actions {
                match flowgrid_component::dispatch::apply(&registry.targets, &registry.tree, &mut store, action) {
                    ApplyOutcome::Applied => {}
                    outcome => tracing::warn!(?action, ?outcome, "action-log replay: action did not apply cleanly"),
                }
            }
            store.commit();
            let gesture = Gesture { actions: entry.actions.iter().map(|(_, a)| (a.clone(), entry.time)).collect() };
            history.append_record_without_merge(store.clone(), gesture, entry.time);
        }
        history.set_index(log.index, &mut store);
        app.refresh_all(&store);

        let mut project_state = ProjectState::new();
        project_state.mark_loaded(path, cwd);

        Ok(Session {
            store,
            history,
            queue: ActionQueue::new(QUEUE_CAPACITY),
            listeners: ListenerRegistry::new(),
            registry,
            app,
            project_state,
        })
    }

    /// Encodes the current history as a `.fla` action log and writes it to
    /// `path`: one gesture entry per history record past the initial one,
    /// paired with the history's current index. Flushes any in-progress
    /// gesture first, same as [`Session::save_snapshot`].
    ///
    /// # Errors
    /// Returns [`ProjectError`] if the file can't be written.
    pub fn save_action_log(&mut self, path: &FsPath, now: Timestamp, cwd: &FsPath) -> Result<(), ProjectError> {
        self.history.flush(now, &self.store);
        let gestures = self
            .history
            .records()
            .iter()
            .skip(1)
            .map(|record| GestureEntry {
                actions: record
                    .gesture
                    .actions
                    .iter()
                    .filter_map(|(action, _)| action.path().map(|p| (p.clone(), action.clone())))
                    .collect(),
                time: record.time,
            })
            .collect();
        let log = ActionLogFile { index: self.history.current_index(), gestures };
        let json = log.to_json();
        let text = serde_json::to_string_pretty(&json).expect("action log JSON is always serializable");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProjectError::io(parent, source))?;
        }
        fs::write(path, text).map_err(|source| ProjectError::io(path, source))?;
        self.project_state.mark_saved(path, cwd);
        Ok(())
    }

    /// A producer handle for this session's action queue.
    pub fn sender(&self) -> ActionSender {
        self.queue.sender()
    }

    /// Enqueues `action` directly, bypassing a separate sender handle.
    ///
    /// # Errors
    /// Returns [`QueueError`] if the queue is full or closed.
    pub fn enqueue(&self, action: Action) -> Result<(), QueueError> {
        self.sender().enqueue(action)
    }

    /// The store as of the last committed frame.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The history engine.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The live component tree handles.
    pub fn app(&self) -> &AppTree {
        &self.app
    }

    /// Open-project bookkeeping (current path, unsaved changes).
    pub fn project_state(&self) -> &ProjectState {
        &self.project_state
    }

    /// Runs one frame: drains the queue, applies every action in dequeue
    /// order, and lets history and the listener registry observe the
    /// result.
    ///
    /// `Store.*` actions (history navigation) end whatever batch is
    /// in-flight before running, since navigation touches the store
    /// directly rather than through a transient; everything else
    /// accumulates into the current batch until the next navigation action
    /// or the end of the frame.
    pub fn run_frame(&mut self, now: Timestamp) {
        let actions = self.queue.drain();
        let mut batch = Vec::new();
        for action in actions {
            if let Action::Store(nav) = &action {
                self.flush_batch(&batch, now);
                batch.clear();
                self.navigate(nav, now);
            } else {
                batch.push(action);
            }
        }
        self.flush_batch(&batch, now);
    }

    fn flush_batch(&mut self, batch: &[Action], now: Timestamp) {
        if batch.is_empty() {
            return;
        }
        self.store.begin_transient();
        let mut applied = Vec::new();
        for action in batch {
            match flowgrid_component::dispatch::apply(&self.registry.targets, &self.registry.tree, &mut self.store, action)
            {
                ApplyOutcome::Applied => applied.push(action.clone()),
                ApplyOutcome::ValidationFailed => {
                    tracing::warn!(?action, "action failed validation and was dropped");
                }
                ApplyOutcome::NotHandled => {
                    tracing::error!(?action, "action had no component target and no history handler");
                }
            }
        }
        let patch = self.store.checked_commit();
        if !patch.is_empty() {
            self.project_state.mark_dirty();
        }
        self.history.observe_frame(&applied, &patch, now, &self.store);
        self.after_store_change(&patch);
    }

    fn navigate(&mut self, action: &StoreAction, now: Timestamp) {
        let patch = match action {
            StoreAction::Undo => self.history.undo(&mut self.store, now),
            StoreAction::Redo => self.history.redo(&mut self.store),
            StoreAction::SetHistoryIndex(index) => self.history.set_index(*index, &mut self.store),
        };
        self.after_store_change(&patch);
    }

    fn after_store_change(&mut self, patch: &flowgrid_store::Patch) {
        if patch.is_empty() {
            return;
        }
        self.app.refresh_all(&self.store);
        let touched = Store::touched_paths(&[patch]);
        self.listeners.notify(&self.registry.tree, &touched);
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_action::BoolAction;
    use flowgrid_path::Path;

    #[test]
    fn fresh_session_has_default_project_tree() {
        let session = Session::new();
        assert!(session.app().mixer.window.is_visible(session.store()));
        assert!(!session.project_state().has_changes());
    }

    #[test]
    fn toggling_mute_commits_a_history_record() {
        let mut session = Session::new();
        session.enqueue(Action::Bool(BoolAction::Toggle { path: Path::from("/windows/mixer/mute") })).unwrap();
        session.run_frame(0);
        assert!(session.app().mixer.mute.as_bool().unwrap());
        assert_eq!(session.history().len(), 2);
        assert!(session.project_state().has_changes());
    }

    #[test]
    fn undo_steps_history_back_and_refreshes_cache() {
        let mut session = Session::new();
        session.enqueue(Action::Bool(BoolAction::Toggle { path: Path::from("/windows/mixer/mute") })).unwrap();
        session.run_frame(0);
        session.enqueue(Action::Store(StoreAction::Undo)).unwrap();
        session.run_frame(1);
        assert!(!session.app().mixer.mute.as_bool().unwrap());
    }

    #[test]
    fn save_and_load_round_trips_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.fls");

        let mut session = Session::new();
        session.enqueue(Action::Bool(BoolAction::Toggle { path: Path::from("/windows/mixer/mute") })).unwrap();
        session.run_frame(0);
        session.save_snapshot(&path, 1, dir.path()).unwrap();
        assert!(!session.project_state().has_changes());

        let loaded = Session::load_snapshot(&path, dir.path()).unwrap();
        assert!(loaded.app().mixer.mute.as_bool().unwrap());
    }

    #[test]
    fn action_log_round_trips_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.fla");

        let mut session = Session::new();
        session.enqueue(Action::Bool(BoolAction::Toggle { path: Path::from("/windows/mixer/mute") })).unwrap();
        session.run_frame(0);
        session
            .enqueue(Action::FloatSet(flowgrid_action::SetAction {
                path: Path::from("/windows/mixer/gain"),
                value: flowgrid_primitive::Primitive::Float(0.5),
            }))
            .unwrap();
        session.run_frame(1);
        session.save_action_log(&path, 2, dir.path()).unwrap();

        let before_index = session.history().current_index();
        let loaded = Session::load_action_log(&path, dir.path()).unwrap();

        assert!(loaded.app().mixer.mute.as_bool().unwrap());
        assert_eq!(loaded.app().mixer.gain.as_f32().unwrap(), 0.5);
        assert_eq!(loaded.history().current_index(), before_index);
        assert_eq!(loaded.history().len(), session.history().len());
    }

    #[test]
    fn validation_failure_is_dropped_without_touching_history() {
        let mut session = Session::new();
        session
            .enqueue(Action::IntSet(flowgrid_action::SetAction {
                path: Path::from("/font_scale"),
                value: flowgrid_primitive::Primitive::Int(3),
            }))
            .unwrap();
        session.run_frame(0);
        assert_eq!(session.history().len(), 1);
    }
}
