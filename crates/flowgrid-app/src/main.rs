//! `flowgrid`: a headless CLI over the project-state core, for exercising
//! `new`/`inspect`/`replay` without the (out-of-scope) ImGui rendering
//! layer attached. A real desktop build wires the same [`flowgrid_app`]
//! crate to an ImGui/miniaudio/Faust frontend instead of this binary.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flowgrid")]
#[command(author, version, about = "FlowGrid project-state core CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh project and save it to disk.
    New(commands::new::NewArgs),

    /// Load a project and print its store contents and history position.
    Inspect(commands::inspect::InspectArgs),

    /// Replay a scripted action sequence against a fresh session.
    Replay(commands::replay::ReplayArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    tracing::debug!(command = ?std::mem::discriminant(&cli.command), "dispatching command");

    match cli.command {
        Commands::New(args) => commands::new::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Replay(args) => commands::replay::run(args),
    }
}
