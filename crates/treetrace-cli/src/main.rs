//! Treetrace command line
//!
//! Runs scripted workloads against the reference trees with a tracer attached
//! and writes the recorded history for the browser visualizer, or replays an
//! exported history as text.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod render;

use commands::{replay::ReplayArgs, run::RunArgs};

#[derive(Parser)]
#[command(name = "treetrace")]
#[command(about = "Treetrace - record and replay linked-tree algorithms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults to ./treetrace.toml when it exists)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace operations on a reference tree and export the history
    Run(RunArgs),

    /// Print the steps of an exported history
    Replay(ReplayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::run::run(&args, config)?;
        }
        Commands::Replay(args) => {
            commands::replay::replay(&args)?;
        }
    }

    Ok(())
}
