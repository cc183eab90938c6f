use clap::Args;

use super::Context;

#[derive(Args)]
pub struct HashPasswordArgs {
    /// Password to hash
    password: String,
}

pub fn run(args: HashPasswordArgs, ctx: &Context) -> anyhow::Result<()> {
    if args.password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hash = lumen_server::auth::hash_password(&args.password)?;
    if ctx.json {
        println!("{}", serde_json::json!({ "password_hash": hash }));
    } else {
        println!("password_hash = '{hash}'");
    }
    Ok(())
}
