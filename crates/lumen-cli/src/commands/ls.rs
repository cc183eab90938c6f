use clap::Args;
use console::style;
use lumen_core::models::item::ItemType;
use lumen_core::models::sort::{SortBy, SortOrder};
use lumen_scan::guard;

use super::Context;

#[derive(Args)]
pub struct LsArgs {
    /// Folder relative to the media root (defaults to the root)
    #[arg(default_value = "")]
    path: String,

    /// Sort key: name, type, size or date
    #[arg(long, default_value = "name")]
    sort: SortBy,

    /// Sort order: asc or desc
    #[arg(long, default_value = "asc")]
    order: SortOrder,
}

pub fn run(args: LsArgs, ctx: &Context) -> anyhow::Result<()> {
    let library = ctx.library()?;
    let rel = guard::normalize(&args.path)
        .ok_or_else(|| anyhow::anyhow!("invalid path: {}", args.path))?;
    if !library.resolve(&rel).is_some_and(|p| p.is_dir()) {
        anyhow::bail!("not a folder: '{}'", rel);
    }

    let listing = library.list(&rel, args.sort, args.order);

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&listing.items)?);
        return Ok(());
    }

    if listing.items.is_empty() {
        println!("(empty)");
        return Ok(());
    }

    println!(
        "{:<16} {:<6} {:>12} {:<19} NAME",
        "ID", "TYPE", "SIZE", "MODIFIED"
    );
    for item in &listing.items {
        let name = if item.item_type == ItemType::Folder {
            style(format!("{}/", item.display_name)).bold().blue().to_string()
        } else if item.is_problematic {
            style(item.display_name.clone()).yellow().to_string()
        } else {
            item.display_name.clone()
        };
        println!(
            "{:<16} {:<6} {:>12} {:<19} {}",
            item.id,
            item.item_type.to_string(),
            item.size,
            item.modified.format("%Y-%m-%d %H:%M:%S"),
            name
        );
    }
    if listing.image_only {
        println!("{} images (paged in the browser)", listing.items.len());
    }
    Ok(())
}
