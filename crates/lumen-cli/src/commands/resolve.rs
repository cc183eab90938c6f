use clap::Args;
use lumen_core::models::item_id::ItemId;
use lumen_scan::guard;

use super::Context;

#[derive(Args)]
pub struct ResolveArgs {
    /// Folder the identifier lives in ("" for the root)
    parent: String,

    /// Identifier to look up
    id: String,
}

pub fn run(args: ResolveArgs, ctx: &Context) -> anyhow::Result<()> {
    let library = ctx.library()?;
    let parent = guard::normalize(&args.parent)
        .ok_or_else(|| anyhow::anyhow!("invalid path: {}", args.parent))?;
    let id = ItemId::parse(&args.id)
        .ok_or_else(|| anyhow::anyhow!("not an identifier: {}", args.id))?;

    let item = library
        .resolve_identifier(&parent, &id)
        .ok_or_else(|| anyhow::anyhow!("no entry with id {} in '{}'", id, parent))?;

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "id": id,
                "path": item.rel_path,
                "abs_path": item.abs_path.display().to_string(),
            })
        );
    } else {
        println!("{}", item.rel_path);
    }
    Ok(())
}
