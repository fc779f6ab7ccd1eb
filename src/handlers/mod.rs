//! IRC command handlers.
//!
//! The [`Handler`] trait and the [`Registry`] that maps verbs to handlers.
//! Dispatch is a pure routing step: it uppercases the verb, finds the
//! handler, and reports 421 for anything unknown. All business validation
//! lives in the handlers themselves.

mod channel;
mod connection;
mod helpers;
mod messaging;
mod mode;
mod user_query;

pub use helpers::{
    err_chanoprivsneeded, err_nosuchchannel, err_nosuchnick, err_notonchannel, server_reply,
};

pub use channel::{InviteHandler, JoinHandler, KickHandler, PartHandler, TopicHandler};
pub use connection::{CapHandler, NickHandler, PassHandler, QuitHandler, UserHandler};
pub use messaging::PrivmsgHandler;
pub use mode::ModeHandler;
pub use user_query::WhoHandler;

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Hub, SessionId};
use async_trait::async_trait;
use minirc_proto::{Message, Response};
use std::collections::HashMap;
use std::sync::Arc;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The originating session's connection handle.
    pub uid: SessionId,
    /// Shared server state.
    pub hub: &'a Arc<Hub>,
}

impl Context<'_> {
    /// Queue a reply to the originating session.
    pub fn send(&self, msg: Message) {
        self.hub.send_to(self.uid, msg);
    }

    /// Queue a numeric reply to the originating session.
    pub fn reply<P>(&self, response: Response, params: P)
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.send(Message::reply(&self.hub.server_name, response, params));
    }

    /// Require a registered session; returns its nick or fails with the
    /// "not registered" error.
    pub async fn require_registered(&self) -> Result<String, HandlerError> {
        let Some(session) = self.hub.session(self.uid) else {
            return Err(HandlerError::NotRegistered);
        };
        let guard = session.read().await;
        if !guard.registered {
            return Err(HandlerError::NotRegistered);
        }
        Ok(guard.nick.clone())
    }
}

/// Trait implemented by all command handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle an incoming message.
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;
}

/// Registry of command handlers, resolved once at startup.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration
        handlers.insert("PASS", Box::new(PassHandler));
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));
        handlers.insert("CAP", Box::new(CapHandler));

        // Channels
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("INVITE", Box::new(InviteHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("MODE", Box::new(ModeHandler));

        // Messaging
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));

        // Discovery
        handlers.insert("WHO", Box::new(WhoHandler));

        Self { handlers }
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// The verb is matched case-insensitively against the fixed table; a
    /// partial token like `JOINX` is simply an unknown verb and yields 421.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let cmd_name = msg.command.to_ascii_uppercase();

        match self.handlers.get(cmd_name.as_str()) {
            Some(handler) => handler.handle(ctx, msg).await,
            None => {
                let nick = ctx.hub.nick_of(ctx.uid).await;
                ctx.reply(
                    Response::ERR_UNKNOWNCOMMAND,
                    [nick.as_str(), cmd_name.as_str(), "Unknown command"],
                );
                Ok(())
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
