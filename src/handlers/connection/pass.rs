//! PASS command handler.

use super::super::{Context, Handler};
use super::try_register;
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::{Message, Response};
use tracing::debug;

/// Handler for PASS: stores the connection password for the registration
/// check. Rejected once the session is registered.
pub struct PassHandler;

#[async_trait]
impl Handler for PassHandler {
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

        let password = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        session.write().await.password = password.to_string();
        debug!(session = ctx.uid, "Password set");

        // PASS may arrive after NICK/USER on a retry.
        try_register(ctx).await
    }
}
