//! NICK command handler.

use super::super::{Context, Handler};
use super::try_register;
use crate::error::HandlerResult;
use async_trait::async_trait;
use minirc_proto::{Message, NickExt, Prefix, Response};
use tracing::info;

/// Handler for NICK: sets the initial nickname or changes an existing one.
///
/// Uniqueness is a case-sensitive exact match against every current
/// nickname, registered or not. A change on a registered session is
/// broadcast to the session itself and to every session sharing at least
/// one channel with it, each exactly once.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Some(session) = ctx.hub.session(ctx.uid) else {
            return Ok(());
        };

        let (old_nick, user, host, registered) = {
            let guard = session.read().await;
            (
                guard.nick.clone(),
                guard.user.clone(),
                guard.host.clone(),
                guard.registered,
            )
        };
        let display = if old_nick.is_empty() {
            "*"
        } else {
            old_nick.as_str()
        };

        let Some(new_nick) = msg.arg(0) else {
            ctx.reply(
                Response::ERR_NONICKNAMEGIVEN,
                [display, "No nickname given"],
            );
            return Ok(());
        };

        if !new_nick.is_valid_nick() {
            ctx.reply(
                Response::ERR_ERRONEUSNICKNAME,
                [display, new_nick, "Erroneous nickname"],
            );
            return Ok(());
        }

        if new_nick == old_nick {
            return Ok(());
        }

        if let Some(owner) = ctx.hub.find_by_nick(new_nick) {
            if owner != ctx.uid {
                ctx.reply(
                    Response::ERR_NICKNAMEINUSE,
                    [display, new_nick, "Nickname is already in use"],
                );
                return Ok(());
            }
        }

        // Registered sessions announce the change before it is applied so
        // the message carries the old identity as its source.
        if registered && !old_nick.is_empty() {
            let change = Message::new(
                Some(Prefix::new(&old_nick, &user, &host)),
                "NICK",
                [new_nick],
            )
            .with_trailing();
            ctx.send(change.clone());
            for observer in ctx.hub.shared_observers(ctx.uid).await {
                ctx.hub.send_to(observer, change.clone());
            }
            info!(old = %old_nick, new = %new_nick, "Nickname changed");
        }

        session.write().await.nick = new_nick.to_string();
        ctx.hub.bind_nick(ctx.uid, &old_nick, new_nick);

        try_register(ctx).await
    }
}
