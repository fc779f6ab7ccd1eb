//! INVITE command handler.

use super::super::{
    Context, Handler, err_chanoprivsneeded, err_nosuchchannel, err_nosuchnick, err_notonchannel,
};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::{Message, Prefix, Response};
use tracing::info;

/// Handler for INVITE.
///
/// On an invite-only channel, only operators may invite. The invite is
/// recorded on the channel and consumed by the target's next JOIN.
pub struct InviteHandler;

#[async_trait]
impl Handler for InviteHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let target_nick = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let channel_name = msg.arg(1).ok_or(HandlerError::NeedMoreParams)?;

        let server = ctx.hub.server_name.clone();
        let Some(channel) = ctx.hub.channel(channel_name) else {
            ctx.send(err_nosuchchannel(&server, &nick, channel_name));
            return Ok(());
        };

        let target = {
            let mut guard = channel.write().await;
            if !guard.is_member(ctx.uid) {
                drop(guard);
                ctx.send(err_notonchannel(&server, &nick, channel_name));
                return Ok(());
            }
            if guard.modes.invite_only && !guard.is_operator(ctx.uid) {
                drop(guard);
                ctx.send(err_chanoprivsneeded(&server, &nick, channel_name));
                return Ok(());
            }
            let Some(target) = ctx.hub.find_by_nick(target_nick) else {
                drop(guard);
                ctx.send(err_nosuchnick(&server, &nick, target_nick));
                return Ok(());
            };
            if guard.is_member(target) {
                drop(guard);
                ctx.reply(
                    Response::ERR_USERONCHANNEL,
                    [
                        nick.as_str(),
                        target_nick,
                        channel_name,
                        "is already on channel",
                    ],
                );
                return Ok(());
            }
            guard.invite(target);
            target
        };

        ctx.reply(
            Response::RPL_INVITING,
            [nick.as_str(), target_nick, channel_name],
        );

        let (user, host) = {
            let Some(session) = ctx.hub.session(ctx.uid) else {
                return Ok(());
            };
            let guard = session.read().await;
            (guard.user.clone(), guard.host.clone())
        };
        let invite_msg = Message::new(
            Some(Prefix::new(&nick, &user, &host)),
            "INVITE",
            [target_nick, channel_name],
        );
        ctx.hub.send_to(target, invite_msg);

        info!(by = %nick, target = %target_nick, channel = %channel_name, "Invited");
        Ok(())
    }
}
