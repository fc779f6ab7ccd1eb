//! The hub: owner of all sessions, channels, and outbound send paths.
//!
//! Handlers receive the hub by reference; nothing here is ambient global
//! state. All removal funnels through [`Hub::teardown`] and
//! [`Hub::reap_if_empty`] so create/delete logic is never duplicated per
//! handler.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use minirc_proto::Message;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use crate::config::Config;
use crate::state::{Channel, Session, SessionId};

/// Outbound queue depth per connection. A full queue means the peer is not
/// draining its socket; further messages to it are dropped, not awaited.
pub const OUTBOUND_QUEUE: usize = 256;

/// Shared server state.
pub struct Hub {
    /// Server name used as the reply prefix.
    pub server_name: String,
    /// Version string for the welcome burst.
    pub version: String,
    /// Server start time, reported in 003.
    pub created: DateTime<Utc>,
    /// The server-wide connection password.
    password: String,
    next_id: AtomicU64,
    /// All live sessions by connection handle.
    pub sessions: DashMap<SessionId, Arc<RwLock<Session>>>,
    /// Outbound send path per connection, kept out of the session lock.
    pub senders: DashMap<SessionId, mpsc::Sender<Message>>,
    /// Nickname table; keys are exact (nicknames are case-sensitive here).
    pub nicks: DashMap<String, SessionId>,
    /// Channel registry.
    pub channels: DashMap<String, Arc<RwLock<Channel>>>,
}

impl Hub {
    pub fn new(config: &Config) -> Self {
        Self {
            server_name: config.server.name.clone(),
            version: format!("minircd-{}", env!("CARGO_PKG_VERSION")),
            created: Utc::now(),
            password: config.server.password.clone(),
            next_id: AtomicU64::new(1),
            sessions: DashMap::new(),
            senders: DashMap::new(),
            nicks: DashMap::new(),
            channels: DashMap::new(),
        }
    }

    /// The server-wide password PASS must match.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Create a session for a newly accepted connection. Returns the
    /// connection handle and the receiving end of its outbound queue.
    pub fn register_connection(&self, host: String) -> (SessionId, mpsc::Receiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
        self.sessions
            .insert(id, Arc::new(RwLock::new(Session::new(id, host))));
        self.senders.insert(id, tx);
        debug!(session = id, "Session created");
        (id, rx)
    }

    pub fn session(&self, id: SessionId) -> Option<Arc<RwLock<Session>>> {
        self.sessions.get(&id).map(|s| s.clone())
    }

    pub fn channel(&self, name: &str) -> Option<Arc<RwLock<Channel>>> {
        self.channels.get(name).map(|c| c.clone())
    }

    /// Resolve a nickname to a session, exact match.
    pub fn find_by_nick(&self, nick: &str) -> Option<SessionId> {
        self.nicks.get(nick).map(|id| *id)
    }

    /// The display nickname of a session (`*` until one is set).
    pub async fn nick_of(&self, id: SessionId) -> String {
        match self.session(id) {
            Some(session) => session.read().await.display_nick().to_string(),
            None => "*".to_string(),
        }
    }

    /// Queue a message to one session. A full or closed queue is a
    /// per-recipient delivery failure: logged, never propagated.
    pub fn send_to(&self, id: SessionId, msg: Message) -> bool {
        let Some(tx) = self.senders.get(&id) else {
            return false;
        };
        match tx.try_send(msg) {
            Ok(()) => true,
            Err(e) => {
                warn!(session = id, error = %e, "Dropping undeliverable message");
                false
            }
        }
    }

    /// Deliver one message to every listed session in order, optionally
    /// excluding one. Failed sends do not stop the fan-out.
    pub fn broadcast(&self, members: &[SessionId], msg: &Message, exclude: Option<SessionId>) {
        for &member in members {
            if Some(member) == exclude {
                continue;
            }
            self.send_to(member, msg.clone());
        }
    }

    /// Every session sharing at least one channel with `id`, deduplicated,
    /// excluding `id` itself.
    pub async fn shared_observers(&self, id: SessionId) -> Vec<SessionId> {
        let Some(session) = self.session(id) else {
            return Vec::new();
        };
        let channel_names = session.read().await.channels().to_vec();

        let mut seen = HashSet::new();
        let mut observers = Vec::new();
        for name in channel_names {
            let Some(channel) = self.channel(&name) else {
                continue;
            };
            for &member in channel.read().await.members() {
                if member != id && seen.insert(member) {
                    observers.push(member);
                }
            }
        }
        observers
    }

    /// Rebind the nickname table after a NICK change or first NICK.
    pub fn bind_nick(&self, id: SessionId, old: &str, new: &str) {
        if !old.is_empty() {
            self.nicks.remove_if(old, |_, owner| *owner == id);
        }
        self.nicks.insert(new.to_string(), id);
    }

    /// Remove a channel from the registry once its last member is gone.
    ///
    /// The emptiness check runs under the registry shard lock; a concurrent
    /// joiner holding the channel lock keeps the entry alive.
    pub fn reap_if_empty(&self, name: &str) {
        let removed = self
            .channels
            .remove_if(name, |_, channel| {
                channel
                    .try_read()
                    .map(|guard| guard.member_count() == 0)
                    .unwrap_or(false)
            })
            .is_some();
        if removed {
            debug!(channel = name, "Channel empty, removed");
        }
    }

    /// The single teardown path for a disconnecting session, whatever the
    /// cause (QUIT, EOF, I/O error). Notifies every session sharing a
    /// channel exactly once, removes the session from each channel
    /// (reaping emptied ones), and releases all tables.
    pub async fn teardown(&self, id: SessionId, reason: &str) {
        let Some((_, session)) = self.sessions.remove(&id) else {
            return;
        };

        let (prefix, nick, channel_names) = {
            let mut guard = session.write().await;
            (guard.prefix(), guard.nick.clone(), guard.take_channels())
        };
        if !nick.is_empty() {
            self.nicks.remove_if(&nick, |_, owner| *owner == id);
        }

        let quit_msg = Message::new(Some(prefix), "QUIT", [reason]).with_trailing();
        let mut seen = HashSet::new();
        let mut observers = Vec::new();
        for name in &channel_names {
            let Some(channel) = self.channel(name) else {
                continue;
            };
            {
                let mut guard = channel.write().await;
                for &member in guard.members() {
                    if member != id && seen.insert(member) {
                        observers.push(member);
                    }
                }
                guard.remove_member(id);
            }
            self.reap_if_empty(name);
        }

        for observer in observers {
            self.send_to(observer, quit_msg.clone());
        }

        self.senders.remove(&id);
        debug!(session = id, nick = %nick, reason = %reason, "Session destroyed");
    }
}
