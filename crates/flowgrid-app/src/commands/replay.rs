//! `flowgrid replay`: drives a session headlessly from a scripted sequence
//! of frames, each enqueuing a batch of actions at a given timestamp. Used
//! to exercise the core's per-frame control flow (§5) without a UI attached
//! — the same mechanism the action protocol's producers use, just fed from
//! a file instead of real input.

use std::path::PathBuf;

use clap::Args;
use flowgrid_action::Action;
use flowgrid_app::{AppError, Session};
use serde::Deserialize;

/// One scripted frame: a timestamp (microseconds since an arbitrary epoch,
/// matching [`flowgrid_history::Timestamp`]) and the actions to enqueue
/// before running that frame.
#[derive(Debug, Deserialize)]
struct ReplayFrame {
    time: i64,
    actions: Vec<Action>,
}

/// The full scripted shape: `{ frames: [{ time, actions }] }`.
#[derive(Debug, Deserialize)]
struct ReplayScript {
    frames: Vec<ReplayFrame>,
}

/// Replays a scripted action sequence against a fresh session.
#[derive(Args)]
pub struct ReplayArgs {
    /// JSON replay script: `{ "frames": [{ "time": 0, "actions": [...] }] }`.
    pub script: PathBuf,

    /// Optional path to save the resulting project to afterward (`.fls` or
    /// `.fla`).
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Runs the `replay` command.
pub fn run(args: ReplayArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.script).map_err(|source| AppError::io(&args.script, source))?;
    let script: ReplayScript =
        serde_json::from_str(&text).map_err(|source| AppError::script(&args.script, source))?;

    let mut session = Session::new();
    let mut last_time = 0;
    for frame in &script.frames {
        for action in frame.actions.clone() {
            session.enqueue(action)?;
        }
        session.run_frame(frame.time);
        last_time = frame.time;
    }

    println!("replayed {} frame(s); history now at {}/{}", script.frames.len(), session.history().current_index(), session.history().len() - 1);

    if let Some(save_path) = &args.save {
        let cwd = std::env::current_dir().map_err(|source| AppError::io(".", source))?;
        let format = flowgrid_project::format_for_extension(save_path)?;
        match format {
            flowgrid_project::ProjectFormat::Snapshot => session.save_snapshot(save_path, last_time, &cwd)?,
            flowgrid_project::ProjectFormat::ActionLog => session.save_action_log(save_path, last_time, &cwd)?,
        }
        println!("saved to {}", save_path.display());
    }

    Ok(())
}
