use clap::Args;
use lumen_scan::{guard, identifier_of};

use super::Context;

#[derive(Args)]
pub struct IdArgs {
    /// Path relative to the media root
    path: String,
}

pub fn run(args: IdArgs, ctx: &Context) -> anyhow::Result<()> {
    let rel = guard::normalize(&args.path)
        .ok_or_else(|| anyhow::anyhow!("invalid path: {}", args.path))?;
    let id = identifier_of(&rel);
    if ctx.json {
        println!("{}", serde_json::json!({ "path": rel, "id": id }));
    } else {
        println!("{id}");
    }
    Ok(())
}
