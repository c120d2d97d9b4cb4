use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::ServerContext;

pub async fn run(cfg: &Config, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    serve(listener, ctx).await
}

/// Accepts connections forever, spawning one task per connection.
///
/// Tasks are not tracked. Each owns its socket and drops it on every exit
/// path, and a failing task only logs.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let conn = Connection::new(socket, peer.to_string(), ctx);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
