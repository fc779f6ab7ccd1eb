//! TOPIC command handler.

use super::super::{
    Context, Handler, err_chanoprivsneeded, err_nosuchchannel, err_notonchannel,
};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use chrono::Utc;
use minirc_proto::{Message, Prefix, Response};
use tracing::info;

/// Handler for TOPIC: query with one parameter, set with two.
///
/// Setting requires operator status while the channel is `+t`. Setting an
/// empty text clears the topic.
pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let channel_name = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;

        let server = ctx.hub.server_name.clone();
        let Some(channel) = ctx.hub.channel(channel_name) else {
            ctx.send(err_nosuchchannel(&server, &nick, channel_name));
            return Ok(());
        };

        let Some(text) = msg.arg(1) else {
            // Query.
            let guard = channel.read().await;
            if !guard.is_member(ctx.uid) {
                drop(guard);
                ctx.send(err_notonchannel(&server, &nick, channel_name));
                return Ok(());
            }
            match guard.topic.clone() {
                Some(topic) => {
                    let set_at = topic.set_at.to_string();
                    ctx.reply(
                        Response::RPL_TOPIC,
                        [nick.as_str(), channel_name, topic.text.as_str()],
                    );
                    ctx.reply(
                        Response::RPL_TOPICWHOTIME,
                        [
                            nick.as_str(),
                            channel_name,
                            topic.set_by.as_str(),
                            set_at.as_str(),
                        ],
                    );
                }
                None => ctx.reply(
                    Response::RPL_NOTOPIC,
                    [nick.as_str(), channel_name, "No topic is set"],
                ),
            }
            return Ok(());
        };

        let members = {
            let mut guard = channel.write().await;
            if !guard.is_member(ctx.uid) {
                drop(guard);
                ctx.send(err_notonchannel(&server, &nick, channel_name));
                return Ok(());
            }
            if !guard.can_set_topic(ctx.uid) {
                drop(guard);
                ctx.send(err_chanoprivsneeded(&server, &nick, channel_name));
                return Ok(());
            }
            guard.set_topic(text, &nick, Utc::now().timestamp());
            guard.members().to_vec()
        };

        let (user, host) = {
            let Some(session) = ctx.hub.session(ctx.uid) else {
                return Ok(());
            };
            let guard = session.read().await;
            (guard.user.clone(), guard.host.clone())
        };
        let topic_msg = Message::new(
            Some(Prefix::new(&nick, &user, &host)),
            "TOPIC",
            [channel_name, text],
        )
        .with_trailing();
        ctx.hub.broadcast(&members, &topic_msg, None);

        info!(nick = %nick, channel = %channel_name, topic = %text, "Topic changed");
        Ok(())
    }
}
