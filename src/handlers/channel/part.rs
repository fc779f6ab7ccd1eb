//! PART command handler.

use super::super::{Context, Handler, err_nosuchchannel, err_notonchannel};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::{Message, Prefix};
use tracing::info;

/// Handler for PART.
///
/// The part notification goes to every member, the leaving caller
/// included, before the membership is removed. An emptied channel is
/// deleted.
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let channels_str = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let reason = msg
            .arg(1)
            .filter(|r| !r.is_empty())
            .unwrap_or(nick.as_str())
            .to_string();

        let Some(session) = ctx.hub.session(ctx.uid) else {
            return Ok(());
        };
        let (user, host) = {
            let guard = session.read().await;
            (guard.user.clone(), guard.host.clone())
        };
        let server = ctx.hub.server_name.clone();

        for name in channels_str.split(',') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let Some(channel) = ctx.hub.channel(name) else {
                ctx.send(err_nosuchchannel(&server, &nick, name));
                continue;
            };

            let members = {
                let mut guard = channel.write().await;
                if !guard.is_member(ctx.uid) {
                    drop(guard);
                    ctx.send(err_notonchannel(&server, &nick, name));
                    continue;
                }
                let members = guard.members().to_vec();
                guard.remove_member(ctx.uid);
                members
            };

            let part_msg = Message::new(
                Some(Prefix::new(&nick, &user, &host)),
                "PART",
                [name, reason.as_str()],
            )
            .with_trailing();
            ctx.hub.broadcast(&members, &part_msg, None);

            session.write().await.remove_channel(name);
            ctx.hub.reap_if_empty(name);

            info!(nick = %nick, channel = %name, reason = %reason, "Left channel");
        }

        Ok(())
    }
}
