use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{Instrument, info};

use crate::config::Config;
use crate::http::connection::Connection;

const BACKLOG: u32 = 1024;

/// Binds `cfg.listen_addr` with `SO_REUSEADDR` set.
pub async fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let addr = tokio::net::lookup_host(&cfg.listen_addr)
        .await
        .with_context(|| format!("resolving {}", cfg.listen_addr))?
        .next()
        .with_context(|| format!("{} resolved to no address", cfg.listen_addr))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("binding {}", addr))?;

    Ok(socket.listen(BACKLOG)?)
}

/// Accepts forever, one task per connection. Tasks share nothing but the
/// immutable config.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, cfg.clone());
        tokio::spawn(
            async move {
                if let Err(e) = conn.run().await {
                    tracing::warn!("Connection error from {}: {:#}", peer, e);
                }
            }
            .instrument(tracing::info_span!("conn", %peer)),
        );
    }
}

pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let listener = bind(&cfg).await?;
    serve(listener, cfg).await
}
