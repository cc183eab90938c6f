use clap::Args;
use lumen_server::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;

use super::Context;

#[derive(Args)]
pub struct ServeArgs {
    /// Media root to serve (overrides media_root)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Address to bind (overrides listen)
    #[arg(long)]
    listen: Option<SocketAddr>,
}

pub fn run(args: ServeArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut config = ctx.config()?;
    if let Some(root) = args.root {
        config.media_root = root;
    }
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if config.password_hash.is_none() {
        tracing::warn!("no password_hash configured: every authenticated route will answer 401");
    }

    let state = AppState::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(state))
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(state.config.listen).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        root = %state.library.root().display(),
        "lumen listening"
    );

    axum::serve(listener, lumen_server::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
