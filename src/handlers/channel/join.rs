//! JOIN command handler.

use super::super::{Context, Handler, err_nosuchchannel};
use crate::error::{HandlerError, HandlerResult};
use crate::state::{Channel, JoinDenied};
use async_trait::async_trait;
use chrono::Utc;
use minirc_proto::{ChannelExt, Message, Prefix, Response};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Maximum number of channels one session may occupy.
pub const MAX_CHANNELS: usize = 10;

/// Handler for JOIN.
///
/// Accepts a comma-separated channel list with positionally matched keys.
/// Channels are processed independently: one failing gate skips only that
/// channel.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let channels_str = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let keys: Vec<&str> = msg
            .arg(1)
            .map(|k| k.split(',').collect())
            .unwrap_or_default();

        for (i, name) in channels_str.split(',').enumerate() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let key = keys.get(i).copied().unwrap_or("");
            join_channel(ctx, &nick, name, key).await?;
        }

        Ok(())
    }
}

/// Join a single channel, creating it if needed.
async fn join_channel(ctx: &mut Context<'_>, nick: &str, name: &str, key: &str) -> HandlerResult {
    let server = ctx.hub.server_name.clone();

    if !name.is_channel_name() {
        ctx.send(err_nosuchchannel(&server, nick, name));
        return Ok(());
    }

    let Some(session) = ctx.hub.session(ctx.uid) else {
        return Ok(());
    };
    let (user, host, channel_count, already_joined) = {
        let guard = session.read().await;
        (
            guard.user.clone(),
            guard.host.clone(),
            guard.channel_count(),
            guard.is_in_channel(name),
        )
    };
    if already_joined {
        return Ok(());
    }
    if channel_count >= MAX_CHANNELS {
        ctx.reply(
            Response::ERR_TOOMANYCHANNELS,
            [nick, name, "You have joined too many channels"],
        );
        return Ok(());
    }

    let now = Utc::now().timestamp();
    let mut created = false;
    let channel = ctx
        .hub
        .channels
        .entry(name.to_string())
        .or_insert_with(|| {
            created = true;
            Arc::new(RwLock::new(Channel::new(name, ctx.uid, now)))
        })
        .clone();

    let (members, topic) = {
        let mut guard = channel.write().await;
        if !created {
            if guard.is_member(ctx.uid) {
                return Ok(());
            }
            match guard.can_join(ctx.uid, key) {
                Ok(()) => {}
                Err(denied) => {
                    let (response, text) = match denied {
                        JoinDenied::InviteOnly => {
                            (Response::ERR_INVITEONLYCHAN, "Cannot join channel (+i)")
                        }
                        JoinDenied::BadKey => {
                            (Response::ERR_BADCHANNELKEY, "Cannot join channel (+k)")
                        }
                        JoinDenied::Full => {
                            (Response::ERR_CHANNELISFULL, "Cannot join channel (+l)")
                        }
                    };
                    drop(guard);
                    ctx.reply(response, [nick, name, text]);
                    info!(nick = %nick, channel = %name, ?denied, "JOIN denied");
                    return Ok(());
                }
            }
            guard.add_member(ctx.uid);
        }
        (guard.members().to_vec(), guard.topic.clone())
    };

    session.write().await.add_channel(name);

    // Everyone in the channel, the joiner included, sees the JOIN.
    let join_msg = Message::new(Some(Prefix::new(nick, &user, &host)), "JOIN", [name]);
    ctx.hub.broadcast(&members, &join_msg, None);

    match topic {
        Some(topic) => {
            let set_at = topic.set_at.to_string();
            ctx.reply(Response::RPL_TOPIC, [nick, name, topic.text.as_str()]);
            ctx.reply(
                Response::RPL_TOPICWHOTIME,
                [nick, name, topic.set_by.as_str(), set_at.as_str()],
            );
        }
        None => ctx.reply(Response::RPL_NOTOPIC, [nick, name, "No topic is set"]),
    }

    // Names list, operators marked with '@', in join order.
    let mut names = Vec::new();
    {
        let guard = channel.read().await;
        for &member in guard.members() {
            let Some(member_session) = ctx.hub.session(member) else {
                continue;
            };
            let member_nick = member_session.read().await.nick.clone();
            if guard.is_operator(member) {
                names.push(format!("@{}", member_nick));
            } else {
                names.push(member_nick);
            }
        }
    }
    let names = names.join(" ");
    ctx.reply(Response::RPL_NAMREPLY, [nick, "=", name, names.as_str()]);
    ctx.reply(Response::RPL_ENDOFNAMES, [nick, name, "End of /NAMES list"]);

    info!(nick = %nick, channel = %name, members = members.len(), created, "Joined channel");
    Ok(())
}
