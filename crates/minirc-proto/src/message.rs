//! IRC message parsing and serialization.
//!
//! Implements the RFC 1459 message grammar:
//!
//! ```text
//! [':' prefix SPACE] command {SPACE middle} [SPACE ':' trailing]
//! ```
//!
//! Parsing operates on a line without its CR-LF terminator; `Display`
//! re-attaches the terminator, so a formatted `Message` is exactly what goes
//! on the wire.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::prefix::Prefix;
use crate::response::Response;

/// An owned IRC message.
///
/// The command is kept as an uppercase-insensitive string and parameters as
/// a flat list; a trailing parameter (one introduced by `:`) is the last
/// element of `params`.
///
/// Whether the last parameter was colon-marked is remembered for
/// serialization only; two messages with the same prefix, command, and
/// parameters compare equal either way.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message source, if any.
    pub prefix: Option<Prefix>,
    /// The verb or three-digit numeric.
    pub command: String,
    /// Positional parameters; the last may carry embedded spaces.
    pub params: Vec<String>,
    /// Serialize the last parameter with a `:` even when it needs none.
    trailing: bool,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
            && self.command == other.command
            && self.params == other.params
    }
}

impl Eq for Message {}

impl Message {
    /// Build a message from parts.
    pub fn new<C, P>(prefix: Option<Prefix>, command: C, params: P) -> Self
    where
        C: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Message {
            prefix,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            trailing: false,
        }
    }

    /// Mark the last parameter as a trailing parameter, so it is always
    /// serialized behind a `:`. Reasons and message texts use this.
    pub fn with_trailing(mut self) -> Self {
        self.trailing = true;
        self
    }

    /// Build a numeric reply from the server: `:<server> <code> <params...>`.
    pub fn reply<P>(server_name: &str, response: Response, params: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Message::new(
            Some(Prefix::ServerName(server_name.to_string())),
            response.to_string(),
            params,
        )
    }

    /// Build an `ERROR :<text>` message (sent before closing a link).
    pub fn error<T: Into<String>>(text: T) -> Self {
        Message::new(None, "ERROR", [text.into()]).with_trailing()
    }

    /// Get a positional parameter as a string slice.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.params.get(n).map(String::as_str)
    }

    /// The numeric response code, if the command is a three-digit numeric.
    pub fn response_code(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim_start().trim_end_matches(['\r', '\n']);
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let (prefix, rest) = if let Some(stripped) = input.strip_prefix(':') {
            match stripped.split_once(' ') {
                Some((prefix, rest)) => {
                    // Prefix parsing is infallible.
                    let prefix = prefix.parse().unwrap();
                    (Some(prefix), rest.trim_start())
                }
                None => return Err(ParseError::MissingCommand),
            }
        } else {
            (None, input)
        };

        let (command, mut rest) = match rest.split_once(' ') {
            Some((command, rest)) => (command, rest.trim_start()),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(ParseError::MissingCommand);
        }

        let mut params = Vec::new();
        let mut trailing = false;
        while !rest.is_empty() {
            if let Some(text) = rest.strip_prefix(':') {
                params.push(text.to_string());
                trailing = true;
                break;
            }
            match rest.split_once(' ') {
                Some((middle, tail)) => {
                    params.push(middle.to_string());
                    rest = tail.trim_start();
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Ok(Message {
            prefix,
            command: command.to_string(),
            params,
            trailing,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)?;

        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            let needs_colon = i == last
                && (self.trailing
                    || param.is_empty()
                    || param.contains(' ')
                    || param.starts_with(':'));
            if needs_colon {
                write!(f, " :{}", param)?;
            } else {
                write!(f, " {}", param)?;
            }
        }

        write!(f, "\r\n")
    }
}
