use clap::Args;
use lumen_scan::tree::{index_tree, TreeConfig};

use super::Context;

#[derive(Args)]
pub struct IndexArgs {
    /// Folder to start from (defaults to the media root)
    #[arg(default_value = "")]
    path: String,

    /// Hide the progress spinner
    #[arg(long)]
    quiet: bool,
}

pub fn run(args: IndexArgs, ctx: &Context) -> anyhow::Result<()> {
    let library = ctx.library()?;
    let index = index_tree(&TreeConfig {
        guard: library.guard(),
        types: library.types(),
        start: args.path,
        show_progress: !args.quiet && !ctx.json,
    })?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&index)?);
    } else {
        for entry in &index.entries {
            println!("{}  {:<6} {}", entry.id, entry.item_type.to_string(), entry.path);
        }
        println!(
            "{} files, {} folders, {} bytes",
            index.total_files, index.total_dirs, index.total_bytes
        );
    }

    for err in &index.errors {
        tracing::warn!("{err}");
    }
    Ok(())
}
