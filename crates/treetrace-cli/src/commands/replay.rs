//! `treetrace replay`: print an exported history step by step

use crate::render;
use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use treetrace_core::HistoryDocument;

/// Arguments of `treetrace replay`.
#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Exported history, either a script bundle or a JSON array
    pub path: PathBuf,

    /// Print only this step (1-based)
    #[arg(short, long)]
    pub step: Option<usize>,

    /// Print step headers without the forests
    #[arg(long)]
    pub actions_only: bool,
}

/// Render the selected steps of `document`.
pub fn render_document(document: &HistoryDocument, args: &ReplayArgs) -> Result<String> {
    let total = document.len();
    let range = match args.step {
        Some(step) if step == 0 || step > total => {
            bail!("step {step} is out of range, the history has {total} steps")
        }
        Some(step) => step - 1..step,
        None => 0..total,
    };

    let mut blocks = Vec::with_capacity(range.len());
    for index in range {
        let entry = &document.entries()[index];
        blocks.push(if args.actions_only {
            render::header(index, total, entry)
        } else {
            render::step(index, total, entry)
        });
    }
    let separator = if args.actions_only { "\n" } else { "\n\n" };
    Ok(blocks.join(separator))
}

/// Handle `treetrace replay`.
pub fn replay(args: &ReplayArgs) -> Result<()> {
    let document = HistoryDocument::read(&args.path)
        .with_context(|| format!("failed to read history {}", args.path.display()))?;
    tracing::debug!(steps = document.len(), path = %args.path.display(), "history loaded");
    println!("{}", render_document(&document, args)?);
    Ok(())
}
