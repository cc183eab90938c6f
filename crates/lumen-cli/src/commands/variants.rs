use clap::Args;
use lumen_scan::guard;

use super::Context;

#[derive(Args)]
pub struct VariantsArgs {
    /// Media file relative to the media root
    path: String,
}

pub fn run(args: VariantsArgs, ctx: &Context) -> anyhow::Result<()> {
    let library = ctx.library()?;
    let rel = guard::normalize(&args.path)
        .ok_or_else(|| anyhow::anyhow!("invalid path: {}", args.path))?;
    if !library.resolve(&rel).is_some_and(|p| p.is_file()) {
        anyhow::bail!("not a file: '{}'", rel);
    }

    let variants = library.find_variants(&rel);
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    if variants.is_empty() {
        println!("No quality variants for '{}'", rel);
    } else {
        println!("{:<10} {:<16} PATH", "QUALITY", "ID");
        for v in &variants {
            println!("{:<10} {:<16} {}", v.label, v.id, v.path);
        }
    }
    Ok(())
}
