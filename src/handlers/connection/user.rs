//! USER command handler.

use super::super::{Context, Handler};
use super::try_register;
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::{Message, Response};

/// Handler for USER: stores username and realname.
///
/// Syntax: `USER <username> <mode> <unused> :<realname>`. Only username
/// and realname are kept.
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Some(session) = ctx.hub.session(ctx.uid) else {
            return Ok(());
        };

        {
            let guard = session.read().await;
            if guard.registered {
                ctx.reply(
                    Response::ERR_ALREADYREGISTRED,
                    [guard.display_nick(), "You may not reregister"],
                );
                return Ok(());
            }
        }

        let username = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let realname = msg.arg(3).filter(|r| !r.is_empty()).unwrap_or(username);

        {
            let mut guard = session.write().await;
            guard.user = username.to_string();
            guard.realname = realname.to_string();
        }

        try_register(ctx).await
    }
}
