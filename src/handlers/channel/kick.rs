//! KICK command handler.

use super::super::{
    Context, Handler, err_chanoprivsneeded, err_nosuchchannel, err_notonchannel,
};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::{Message, Prefix, Response};
use tracing::info;

/// Handler for KICK: forcibly remove a member, operators only.
pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let channel_name = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let target_nick = msg.arg(1).ok_or(HandlerError::NeedMoreParams)?;
        let reason = msg
            .arg(2)
            .filter(|r| !r.is_empty())
            .unwrap_or(nick.as_str())
            .to_string();

        let server = ctx.hub.server_name.clone();
        let Some(channel) = ctx.hub.channel(channel_name) else {
            ctx.send(err_nosuchchannel(&server, &nick, channel_name));
            return Ok(());
        };

        let resolved = ctx.hub.find_by_nick(target_nick);
        let (members, target) = {
            let mut guard = channel.write().await;
            if !guard.is_member(ctx.uid) {
                drop(guard);
                ctx.send(err_notonchannel(&server, &nick, channel_name));
                return Ok(());
            }
            if !guard.is_operator(ctx.uid) {
                drop(guard);
                ctx.send(err_chanoprivsneeded(&server, &nick, channel_name));
                return Ok(());
            }
            let target = match resolved {
                Some(id) if guard.is_member(id) => id,
                _ => {
                    drop(guard);
                    ctx.reply(
                        Response::ERR_USERNOTINCHANNEL,
                        [
                            nick.as_str(),
                            target_nick,
                            channel_name,
                            "They aren't on that channel",
                        ],
                    );
                    return Ok(());
                }
            };
            let members = guard.members().to_vec();
            guard.remove_member(target);
            (members, target)
        };

        let (user, host) = {
            let Some(session) = ctx.hub.session(ctx.uid) else {
                return Ok(());
            };
            let guard = session.read().await;
            (guard.user.clone(), guard.host.clone())
        };

        // Everyone, the kicked member included, sees the KICK.
        let kick_msg = Message::new(
            Some(Prefix::new(&nick, &user, &host)),
            "KICK",
            [channel_name, target_nick, reason.as_str()],
        )
        .with_trailing();
        ctx.hub.broadcast(&members, &kick_msg, None);

        if let Some(target_session) = ctx.hub.session(target) {
            target_session.write().await.remove_channel(channel_name);
        }
        ctx.hub.reap_if_empty(channel_name);

        info!(
            by = %nick,
            target = %target_nick,
            channel = %channel_name,
            reason = %reason,
            "Member kicked"
        );
        Ok(())
    }
}
