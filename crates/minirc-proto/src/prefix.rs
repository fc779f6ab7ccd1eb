//! Message prefixes (the `:source` part of a line).

use std::fmt;
use std::str::FromStr;

/// The source of a message: either the server itself or a user mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// A bare server name, e.g. `irc.local`.
    ServerName(String),
    /// A user mask (nick, user, host), rendered as `nick!user@host`.
    Nickname(String, String, String),
}

impl Prefix {
    /// Build a `nick!user@host` prefix.
    pub fn new(nick: &str, user: &str, host: &str) -> Self {
        Prefix::Nickname(nick.to_string(), user.to_string(), host.to_string())
    }

    /// The nickname component, if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => write!(f, "{}!{}@{}", nick, user, host),
        }
    }
}

impl FromStr for Prefix {
    type Err = std::convert::Infallible;

    /// Parse a prefix (without the leading `:`). Anything containing a
    /// `!`/`@` pair is a user mask; everything else is a server name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((nick, rest)) = s.split_once('!') {
            if let Some((user, host)) = rest.split_once('@') {
                return Ok(Prefix::new(nick, user, host));
            }
        }
        Ok(Prefix::ServerName(s.to_string()))
    }
}
