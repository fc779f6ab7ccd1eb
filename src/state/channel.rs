//! The channel entity: membership, operators, invites, topic, and modes.

use std::collections::HashSet;

use crate::state::SessionId;

/// Channel topic with metadata.
#[derive(Debug, Clone)]
pub struct Topic {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

/// Channel mode flags.
///
/// `key` doubles as the `+k` flag: `Some` means key-protected. `limit` of
/// zero means unlimited. `oper_display` is informational only: it mirrors
/// the sign of the last applied operator grant and has no gating effect.
#[derive(Debug, Clone, Default)]
pub struct ChannelModes {
    pub invite_only: bool,
    pub topic_restricted: bool,
    pub key: Option<String>,
    pub limit: usize,
    pub oper_display: bool,
}

/// Why a join attempt was refused. Gates are evaluated in this order and
/// only the first failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDenied {
    InviteOnly,
    BadKey,
    Full,
}

/// A named, many-member communication group.
///
/// Members are kept in join order so listings and broadcasts are
/// deterministic. Invariants: operators are a subset of members; the
/// invited set never intersects the members (an invite is consumed on
/// join).
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub topic: Option<Topic>,
    pub created_at: i64,
    pub modes: ChannelModes,
    members: Vec<SessionId>,
    operators: HashSet<SessionId>,
    invited: HashSet<SessionId>,
}

impl Channel {
    /// Create a channel with its creator as sole member and operator.
    ///
    /// Topic changes start out operator-restricted (`+t`).
    pub fn new(name: &str, creator: SessionId, now: i64) -> Self {
        let mut operators = HashSet::new();
        operators.insert(creator);
        Self {
            name: name.to_string(),
            topic: None,
            created_at: now,
            modes: ChannelModes {
                topic_restricted: true,
                ..Default::default()
            },
            members: vec![creator],
            operators,
            invited: HashSet::new(),
        }
    }

    // --- membership ---

    pub fn is_member(&self, id: SessionId) -> bool {
        self.members.contains(&id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Members in join order.
    pub fn members(&self) -> &[SessionId] {
        &self.members
    }

    /// Check the join gates for a non-member: invite-only, then key, then
    /// user limit. Existing members always pass.
    pub fn can_join(&self, id: SessionId, key: &str) -> Result<(), JoinDenied> {
        if self.is_member(id) {
            return Ok(());
        }
        if self.modes.invite_only && !self.is_invited(id) {
            return Err(JoinDenied::InviteOnly);
        }
        if let Some(ref channel_key) = self.modes.key {
            if key != channel_key {
                return Err(JoinDenied::BadKey);
            }
        }
        if self.modes.limit > 0 && self.members.len() >= self.modes.limit {
            return Err(JoinDenied::Full);
        }
        Ok(())
    }

    /// Add a member, consuming any pending invite. Returns false if the
    /// session was already a member (no duplicate entry is created).
    pub fn add_member(&mut self, id: SessionId) -> bool {
        if self.is_member(id) {
            return false;
        }
        self.members.push(id);
        self.invited.remove(&id);
        true
    }

    /// Remove a member along with any operator or invite status.
    pub fn remove_member(&mut self, id: SessionId) {
        self.members.retain(|m| *m != id);
        self.operators.remove(&id);
        self.invited.remove(&id);
    }

    // --- operators ---

    pub fn is_operator(&self, id: SessionId) -> bool {
        self.operators.contains(&id)
    }

    /// Grant operator status; only current members can be granted.
    /// Returns true if the status actually changed.
    pub fn add_operator(&mut self, id: SessionId) -> bool {
        if self.is_member(id) {
            self.operators.insert(id)
        } else {
            false
        }
    }

    /// Returns true if the status actually changed.
    pub fn remove_operator(&mut self, id: SessionId) -> bool {
        self.operators.remove(&id)
    }

    // --- invites ---

    pub fn invite(&mut self, id: SessionId) {
        self.invited.insert(id);
    }

    pub fn is_invited(&self, id: SessionId) -> bool {
        self.invited.contains(&id)
    }

    // --- topic ---

    /// Topic changes require operator status under `+t`, membership
    /// otherwise.
    pub fn can_set_topic(&self, id: SessionId) -> bool {
        if self.modes.topic_restricted {
            self.is_operator(id)
        } else {
            self.is_member(id)
        }
    }

    /// Set the topic text, setter, and timestamp together. Empty text
    /// clears the topic; an empty topic is reported as "no topic".
    pub fn set_topic(&mut self, text: &str, set_by: &str, now: i64) {
        if text.is_empty() {
            self.topic = None;
        } else {
            self.topic = Some(Topic {
                text: text.to_string(),
                set_by: set_by.to_string(),
                set_at: now,
            });
        }
    }

    // --- messaging ---

    pub fn can_send_message(&self, id: SessionId) -> bool {
        self.is_member(id)
    }

    // --- mode rendering ---

    /// Render the mode flags and their parameters for a MODE query,
    /// e.g. `("+itk", ["secret"])`.
    pub fn mode_string(&self) -> (String, Vec<String>) {
        let mut flags = String::from("+");
        let mut params = Vec::new();

        if self.modes.invite_only {
            flags.push('i');
        }
        if self.modes.topic_restricted {
            flags.push('t');
        }
        if self.modes.key.is_some() {
            flags.push('k');
        }
        if self.modes.oper_display {
            flags.push('o');
        }
        if self.modes.limit > 0 {
            flags.push('l');
        }

        if let Some(ref key) = self.modes.key {
            params.push(key.clone());
        }
        if self.modes.limit > 0 {
            params.push(self.modes.limit.to_string());
        }

        (flags, params)
    }
}
