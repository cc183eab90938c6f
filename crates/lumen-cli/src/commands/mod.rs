pub mod config;
pub mod hash_password;
pub mod id;
pub mod index;
pub mod ls;
pub mod resolve;
pub mod serve;
pub mod variants;

use clap::Subcommand;
use lumen_core::config::LumenConfig;
use lumen_scan::Library;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(serve::ServeArgs),
    /// Initialize or show Lumen configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigAction,
    },
    /// List a folder the way the browse API does
    Ls(ls::LsArgs),
    /// Print the identifier of a relative path
    Id(id::IdArgs),
    /// Find the entry an identifier refers to
    Resolve(resolve::ResolveArgs),
    /// List the quality variants of a media file
    Variants(variants::VariantsArgs),
    /// Write an identifier manifest for a whole tree
    Index(index::IndexArgs),
    /// Generate a password_hash value for the config file
    HashPassword(hash_password::HashPasswordArgs),
}

/// Options shared by every command.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub json: bool,
}

impl Context {
    pub fn config(&self) -> anyhow::Result<LumenConfig> {
        Ok(load_config(self.config_path.as_deref())?)
    }

    pub fn library(&self) -> anyhow::Result<Library> {
        Ok(Library::from_config(&self.config()?)?)
    }
}

/// Load the config from `path` when given, else from the default location.
pub fn load_config(path: Option<&Path>) -> Result<LumenConfig, lumen_core::error::LumenError> {
    match path {
        Some(path) => LumenConfig::load_from(path),
        None => LumenConfig::load(),
    }
}

pub fn run(cmd: Command, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        Command::Serve(args) => serve::run(args, ctx),
        Command::Config { action } => config::run(action, ctx),
        Command::Ls(args) => ls::run(args, ctx),
        Command::Id(args) => id::run(args, ctx),
        Command::Resolve(args) => resolve::run(args, ctx),
        Command::Variants(args) => variants::run(args, ctx),
        Command::Index(args) => index::run(args, ctx),
        Command::HashPassword(args) => hash_password::run(args, ctx),
    }
}
