use std::sync::Arc;

use halo::config::Config;
use halo::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.tracing_level()?)
        .init();

    tracing::info!(
        files_root = %cfg.files_root.display(),
        idle_timeout_ms = cfg.idle_timeout_ms,
        "configuration loaded"
    );

    tokio::select! {
        res = server::listener::run(Arc::new(cfg)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
