//! The per-connection event loop.
//!
//! Each connection owns a framed transport and the receiving end of its
//! outbound queue. The loop multiplexes inbound lines, queued outbound
//! messages, and the shutdown signal. Every exit path (QUIT, EOF, framing
//! error, write error, shutdown) funnels into the hub's single teardown.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use minirc_proto::{LineCodec, Message};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::error::HandlerError;
use crate::handlers::{Context, Registry};
use crate::state::Hub;

/// Drive one client connection to completion.
pub async fn handle_connection(
    hub: Arc<Hub>,
    registry: Arc<Registry>,
    stream: TcpStream,
    addr: SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let (uid, mut outbound) = hub.register_connection(addr.ip().to_string());
    let mut transport = Framed::new(stream, LineCodec::new());
    info!(session = uid, peer = %addr, "Client connected");

    let mut quit_reason: Option<String> = None;

    loop {
        tokio::select! {
            inbound = transport.next() => {
                match inbound {
                    Some(Ok(line)) => {
                        // A line of only the delimiter is a no-op.
                        if line.trim().is_empty() {
                            continue;
                        }
                        let Ok(msg) = line.parse::<Message>() else {
                            continue;
                        };
                        let mut ctx = Context { uid, hub: &hub };
                        match registry.dispatch(&mut ctx, &msg).await {
                            Ok(()) => {}
                            Err(HandlerError::Quit(reason)) => {
                                quit_reason = reason;
                                break;
                            }
                            Err(e) => {
                                let nick = hub.nick_of(uid).await;
                                let verb = msg.command.to_ascii_uppercase();
                                if let Some(reply) =
                                    e.to_irc_reply(&hub.server_name, &nick, &verb)
                                {
                                    hub.send_to(uid, reply);
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        // Framing violations (oversized line, bad UTF-8)
                        // are fatal to this connection only.
                        warn!(session = uid, error = %e, "Protocol error, disconnecting");
                        break;
                    }
                    None => {
                        debug!(session = uid, "Peer closed connection");
                        break;
                    }
                }
            }

            queued = outbound.recv() => {
                match queued {
                    Some(msg) => {
                        if let Err(e) = transport.send(msg).await {
                            warn!(session = uid, error = %e, "Write failed, disconnecting");
                            break;
                        }
                    }
                    // Sender side dropped: the session was torn down.
                    None => break,
                }
            }

            _ = shutdown_rx.recv() => {
                info!(session = uid, "Closing for server shutdown");
                quit_reason = Some("Server shutting down".to_string());
                break;
            }
        }
    }

    let reason = quit_reason.unwrap_or_else(|| "Client Quit".to_string());
    let nick = hub.nick_of(uid).await;

    // Flush anything already queued, then the closing notice. Failures
    // here are swallowed: the peer may already be gone.
    while let Ok(msg) = outbound.try_recv() {
        if transport.send(msg).await.is_err() {
            break;
        }
    }
    let _ = transport
        .send(Message::error(format!(
            "Closing Link: {} (Quit: {})",
            nick, reason
        )))
        .await;

    hub.teardown(uid, &reason).await;
    info!(session = uid, nick = %nick, reason = %reason, "Client disconnected");
}
