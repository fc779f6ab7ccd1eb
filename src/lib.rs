//! minircd - a minimal IRC server.
//!
//! Client registration, channel membership and moderation modes, and
//! message routing over many concurrent TCP connections in one process.
//! The wire-protocol layer lives in the `minirc-proto` crate; this crate
//! holds the server state, the command handlers, and the network loop.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;
