//! `flowgrid new`: writes a fresh, empty project to disk.

use std::path::PathBuf;

use clap::Args;
use flowgrid_app::{AppError, Session};
use flowgrid_project::format_for_extension;

/// Creates a fresh project and saves it to `path`, in whichever of the two
/// on-disk formats its extension selects (`.fls` snapshot or `.fla` action
/// log — a brand-new project's log is simply empty).
#[derive(Args)]
pub struct NewArgs {
    /// Destination path. Must end in `.fls` or `.fla`.
    pub path: PathBuf,
}

/// Runs the `new` command.
pub fn run(args: NewArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().map_err(|source| AppError::io(".", source))?;
    let format = format_for_extension(&args.path)?;
    let mut session = Session::new();

    match format {
        flowgrid_project::ProjectFormat::Snapshot => session.save_snapshot(&args.path, 0, &cwd)?,
        flowgrid_project::ProjectFormat::ActionLog => session.save_action_log(&args.path, 0, &cwd)?,
    }

    println!("wrote a fresh project to {}", args.path.display());
    Ok(())
}
