//! PRIVMSG command handler.

use super::{Context, Handler, err_nosuchnick};
use crate::error::HandlerResult;
use async_trait::async_trait;
use minirc_proto::{ChannelExt, Message, Prefix, Response};

/// Handler for PRIVMSG.
///
/// Channel-prefixed targets fan out to the channel's members, excluding
/// the sender; anything else routes to a single exact nickname.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let server = ctx.hub.server_name.clone();

        let Some(target) = msg.arg(0).filter(|t| !t.is_empty()) else {
            ctx.reply(
                Response::ERR_NORECIPIENT,
                [nick.as_str(), "No recipient given (PRIVMSG)"],
            );
            return Ok(());
        };
        let Some(text) = msg.arg(1).filter(|t| !t.is_empty()) else {
            ctx.reply(Response::ERR_NOTEXTTOSEND, [nick.as_str(), "No text to send"]);
            return Ok(());
        };

        let (user, host) = {
            let Some(session) = ctx.hub.session(ctx.uid) else {
                return Ok(());
            };
            let guard = session.read().await;
            (guard.user.clone(), guard.host.clone())
        };
        let privmsg = Message::new(
            Some(Prefix::new(&nick, &user, &host)),
            "PRIVMSG",
            [target, text],
        )
        .with_trailing();

        if target.is_channel_name() {
            let Some(channel) = ctx.hub.channel(target) else {
                ctx.send(err_nosuchnick(&server, &nick, target));
                return Ok(());
            };
            let members = {
                let guard = channel.read().await;
                if !guard.can_send_message(ctx.uid) {
                    drop(guard);
                    ctx.reply(
                        Response::ERR_CANNOTSENDTOCHAN,
                        [nick.as_str(), target, "Cannot send to channel"],
                    );
                    return Ok(());
                }
                guard.members().to_vec()
            };
            // The sender never receives its own channel message.
            ctx.hub.broadcast(&members, &privmsg, Some(ctx.uid));
        } else {
            let Some(target_id) = ctx.hub.find_by_nick(target) else {
                ctx.send(err_nosuchnick(&server, &nick, target));
                return Ok(());
            };
            ctx.hub.send_to(target_id, privmsg);
        }

        Ok(())
    }
}
