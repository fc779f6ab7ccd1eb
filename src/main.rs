//! minircd - a minimal IRC server.

use minircd::config::Config;
use minircd::handlers::Registry;
use minircd::network::Gateway;
use minircd::state::Hub;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.name,
        port = config.listen.port,
        "Starting minircd"
    );

    let hub = Arc::new(Hub::new(&config));
    let registry = Arc::new(Registry::new());

    let (shutdown_tx, _) = broadcast::channel(1);

    // Ctrl-C asks the gateway loop to exit and every connection to close.
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(());
            }
        });
    }

    let gateway = Gateway::bind(config.bind_addr(), hub, registry).await?;
    gateway.run(shutdown_tx).await?;

    info!("Server stopped");
    Ok(())
}
