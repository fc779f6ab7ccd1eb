//! Error handling for command dispatch.

use minirc_proto::{Message, Response};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during command handling.
///
/// Most protocol errors are replied to at the point of detection inside the
/// handler; the variants here are the ones that cross the handler boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("not registered")]
    NotRegistered,

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Message>),

    /// The client asked to quit; carries the quit reason. Tells the
    /// connection loop to run teardown.
    #[error("client quit: {0:?}")]
    Quit(Option<String>),
}

impl HandlerError {
    /// Convert to an IRC error reply, if this error warrants one.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str, cmd_name: &str) -> Option<Message> {
        let msg = match self {
            Self::NotRegistered => Message::reply(
                server_name,
                Response::ERR_NOTREGISTERED,
                [nick, "You have not registered"],
            ),
            Self::NeedMoreParams => Message::reply(
                server_name,
                Response::ERR_NEEDMOREPARAMS,
                [nick, cmd_name, "Not enough parameters"],
            ),
            Self::Send(_) | Self::Quit(_) => return None,
        };
        Some(msg)
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use minirc_proto::Prefix;

    #[test]
    fn need_more_params_reply() {
        let reply = HandlerError::NeedMoreParams
            .to_irc_reply("irc.local", "alice", "JOIN")
            .unwrap();
        assert_eq!(
            reply.to_string(),
            ":irc.local 461 alice JOIN :Not enough parameters\r\n"
        );
        assert_eq!(reply.prefix, Some(Prefix::ServerName("irc.local".into())));
    }

    #[test]
    fn quit_produces_no_reply() {
        assert!(HandlerError::Quit(None)
            .to_irc_reply("irc.local", "alice", "QUIT")
            .is_none());
    }
}
