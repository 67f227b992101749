//! `flowgrid inspect`: loads a project and prints its store contents and
//! history position, for eyeballing a `.fls`/`.fla` file without a UI.

use std::path::PathBuf;

use clap::Args;
use flowgrid_app::{AppError, Session};
use flowgrid_project::{format_for_extension, ProjectFormat};

/// Loads `path` and prints every store entry plus the history index/length.
#[derive(Args)]
pub struct InspectArgs {
    /// Project file to load (`.fls` or `.fla`).
    pub path: PathBuf,
}

/// Runs the `inspect` command.
pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().map_err(|source| AppError::io(".", source))?;
    let format = format_for_extension(&args.path)?;
    let session = match format {
        ProjectFormat::Snapshot => Session::load_snapshot(&args.path, &cwd)?,
        ProjectFormat::ActionLog => Session::load_action_log(&args.path, &cwd)?,
    };

    println!("{}", args.path.display());
    println!("history: {}/{} records", session.history().current_index(), session.history().len() - 1);
    println!("has changes: {}", session.project_state().has_changes());
    println!();
    for (path, value) in session.store().iter() {
        println!("{path} = {value:?}");
    }
    Ok(())
}
