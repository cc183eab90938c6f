mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen", version, about = "Self-hosted file browser and media server")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Config file to use instead of ~/.lumen/config.toml
    #[arg(long, global = true, env = "LUMEN_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = commands::load_config(cli.config.as_deref())
        .map(|c| c.log_level)
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        json: cli.json,
    };
    commands::run(cli.command, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ls_flags() {
        let cli = Cli::parse_from(["lumen", "ls", "tv", "--sort", "size", "--order", "desc", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, commands::Command::Ls(_)));
    }
}
