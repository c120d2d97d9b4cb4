use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chttpd::config::{Cli, Config};
use chttpd::server::{self, ServerContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load(Cli::parse())?;
    cfg.validate()?;

    let ctx = Arc::new(ServerContext::from_config(&cfg)?);
    tracing::info!(
        root = %cfg.root.display(),
        mime_types = ctx.mime.len(),
        "MIME index ready"
    );

    tokio::select! {
        res = server::listener::run(&cfg, ctx) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
