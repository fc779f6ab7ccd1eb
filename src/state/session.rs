//! Per-connection session state.

/// Unique identifier for a connection, assigned by the gateway on accept.
pub type SessionId = u64;

/// Server-side state for one connected client, before and after
/// registration.
///
/// The outbound send path is not stored here; it lives in the hub's sender
/// table so that delivering a message never takes the session lock.
#[derive(Debug)]
pub struct Session {
    /// Connection handle.
    pub id: SessionId,
    /// Nickname; empty until NICK is accepted.
    pub nick: String,
    /// Username; empty until USER is accepted.
    pub user: String,
    /// Realname from USER, if supplied.
    pub realname: String,
    /// Remote host string.
    pub host: String,
    /// Password supplied via PASS, compared at registration time.
    pub password: String,
    /// True once nickname, username, and the correct password are all in.
    pub registered: bool,
    /// Channels joined, in join order.
    channels: Vec<String>,
}

impl Session {
    pub fn new(id: SessionId, host: String) -> Self {
        Self {
            id,
            nick: String::new(),
            user: String::new(),
            realname: String::new(),
            host,
            password: String::new(),
            registered: false,
            channels: Vec::new(),
        }
    }

    /// Nickname for display in replies: `*` until one is set.
    pub fn display_nick(&self) -> &str {
        if self.nick.is_empty() { "*" } else { &self.nick }
    }

    /// Whether both identity fields needed for registration are present.
    pub fn has_identity(&self) -> bool {
        !self.nick.is_empty() && !self.user.is_empty()
    }

    /// The `nick!user@host` source prefix for messages from this session.
    pub fn prefix(&self) -> minirc_proto::Prefix {
        minirc_proto::Prefix::new(&self.nick, &self.user, &self.host)
    }

    pub fn add_channel(&mut self, name: &str) {
        if !self.is_in_channel(name) {
            self.channels.push(name.to_string());
        }
    }

    pub fn remove_channel(&mut self, name: &str) {
        self.channels.retain(|c| c != name);
    }

    pub fn is_in_channel(&self, name: &str) -> bool {
        self.channels.iter().any(|c| c == name)
    }

    /// Joined channel names in join order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Remove and return all channel memberships (teardown path).
    pub fn take_channels(&mut self) -> Vec<String> {
        std::mem::take(&mut self.channels)
    }
}
