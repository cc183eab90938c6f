use clap::Subcommand;
use lumen_core::config::LumenConfig;

use super::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration (never overwrites an existing file)
    Init,
    /// Show the effective configuration
    Show,
}

pub fn run(action: ConfigAction, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let path = match &ctx.config_path {
                Some(path) => path.clone(),
                None => {
                    LumenConfig::init()?;
                    LumenConfig::config_path()?
                }
            };
            if path.exists() && ctx.config_path.is_some() {
                anyhow::bail!("already exists: {}", path.display());
            }
            if !path.exists() {
                LumenConfig::default().save_to(&path)?;
            }

            let config = LumenConfig::load_from(&path)?;
            let root = config.prepare_media_root()?;
            println!("Config written to {}", path.display());
            println!("Media root: {}", root.display());
            if config.password_hash.is_none() {
                println!("Set password_hash with the output of: lumen hash-password <PASSWORD>");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = ctx.config()?;
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}
