//! The gateway: listens, accepts, and spawns a task per connection.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::handlers::Registry;
use crate::network::handle_connection;
use crate::state::Hub;

/// Owns the listening socket and the accept loop.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
    registry: Arc<Registry>,
}

impl Gateway {
    /// Bind the listening socket.
    pub async fn bind(
        addr: String,
        hub: Arc<Hub>,
        registry: Arc<Registry>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %addr, "Listening");
        Ok(Self {
            listener,
            hub,
            registry,
        })
    }

    /// The bound address; useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown signal fires. Each accepted
    /// connection runs in its own task; connection failures never stop
    /// the accept loop.
    pub async fn run(self, shutdown: broadcast::Sender<()>) -> std::io::Result<()> {
        let mut shutdown_rx = shutdown.subscribe();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let hub = Arc::clone(&self.hub);
                            let registry = Arc::clone(&self.registry);
                            let shutdown_rx = shutdown.subscribe();
                            tokio::spawn(async move {
                                handle_connection(hub, registry, stream, addr, shutdown_rx).await;
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Accept failed");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Gateway shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
