//! Integration test common infrastructure.
//!
//! Runs the server in-process on an ephemeral port and provides a raw-line
//! IRC test client.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use minircd::config::{Config, ListenConfig, ServerConfig};
use minircd::handlers::Registry;
use minircd::network::Gateway;
use minircd::state::Hub;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::broadcast;
use tokio::time::timeout;

/// Server password used by every test.
pub const PASSWORD: &str = "secret";

/// An in-process server instance.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: broadcast::Sender<()>,
}

impl TestServer {
    /// Spawn a server on an ephemeral port.
    pub async fn spawn() -> Self {
        let config = Config {
            server: ServerConfig {
                name: "irc.local".to_string(),
                password: PASSWORD.to_string(),
                description: "Test server".to_string(),
            },
            listen: ListenConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
        };
        let hub = Arc::new(Hub::new(&config));
        let registry = Arc::new(Registry::new());
        let (shutdown, _) = broadcast::channel(1);

        let gateway = Gateway::bind("127.0.0.1:0".to_string(), hub, registry)
            .await
            .expect("Failed to bind test server");
        let addr = gateway.local_addr().expect("No local addr");

        let run_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = gateway.run(run_shutdown).await;
        });

        Self { addr, shutdown }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

/// A raw-line IRC test client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    pub nick: String,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(addr: SocketAddr, nick: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            nick: nick.to_string(),
        }
    }

    /// Send one raw line; the CR-LF terminator is appended if missing.
    pub async fn send_raw(&mut self, line: &str) {
        self.writer
            .write_all(line.as_bytes())
            .await
            .expect("write failed");
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await.expect("write failed");
        }
    }

    /// Receive one line with a timeout, without its terminator.
    pub async fn recv_line(&mut self) -> Result<String, String> {
        self.recv_line_within(Duration::from_secs(5)).await
    }

    pub async fn recv_line_within(&mut self, dur: Duration) -> Result<String, String> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await {
            Ok(Ok(0)) => Err("connection closed".to_string()),
            Ok(Ok(_)) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            Ok(Err(e)) => Err(format!("read error: {}", e)),
            Err(_) => Err("timeout".to_string()),
        }
    }

    /// Receive lines until the predicate matches; returns everything read,
    /// the matching line last.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self
                .recv_line()
                .await
                .unwrap_or_else(|e| panic!("recv_until failed after {:?}: {}", lines, e));
            let done = predicate(&line);
            lines.push(line);
            if done {
                return lines;
            }
        }
    }

    /// Read and discard whatever arrives within the grace period.
    pub async fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.recv_line_within(Duration::from_millis(200)).await {
            lines.push(line);
        }
        lines
    }

    /// Register with PASS + NICK + USER and wait for the 001 welcome.
    pub async fn register(&mut self) {
        let nick = self.nick.clone();
        self.send_raw(&format!("PASS {}", PASSWORD)).await;
        self.send_raw(&format!("NICK {}", nick)).await;
        self.send_raw(&format!("USER {} 0 * :Test User {}", nick, nick))
            .await;
        self.recv_until(|line| line.contains(" 001 ")).await;
        // Swallow the rest of the welcome burst.
        self.recv_until(|line| line.contains(" 004 ")).await;
    }

    /// Join a channel and wait for the end-of-names marker.
    pub async fn join(&mut self, channel: &str) {
        self.send_raw(&format!("JOIN {}", channel)).await;
        self.recv_until(|line| line.contains(" 366 ")).await;
    }
}
