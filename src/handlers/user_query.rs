//! WHO command handler.

use super::{Context, Handler, err_nosuchchannel, err_nosuchnick};
use crate::error::HandlerResult;
use crate::state::SessionId;
use async_trait::async_trait;
use minirc_proto::{ChannelExt, Message, Response};
use std::collections::HashMap;

/// Handler for WHO.
///
/// Without a mask, lists every session sharing at least one channel with
/// the caller, never the global session list. A channel mask lists that
/// channel's members; a nickname mask returns a single entry. The `H`
/// flag is always reported (away-status is not tracked); `@` marks
/// operators in the displayed context.
pub struct WhoHandler;

#[async_trait]
impl Handler for WhoHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let server = ctx.hub.server_name.clone();

        let Some(mask) = msg.arg(0).filter(|m| !m.is_empty()) else {
            return who_visible(ctx, &nick).await;
        };
        let mask = mask.to_string();

        if mask.as_str().is_channel_name() {
            let Some(channel) = ctx.hub.channel(&mask) else {
                ctx.send(err_nosuchchannel(&server, &nick, &mask));
                return Ok(());
            };
            let entries: Vec<(SessionId, bool)> = {
                let guard = channel.read().await;
                guard
                    .members()
                    .iter()
                    .map(|&m| (m, guard.is_operator(m)))
                    .collect()
            };
            for (member, is_op) in entries {
                who_entry(ctx, &nick, &mask, member, is_op).await;
            }
        } else {
            let Some(target) = ctx.hub.find_by_nick(&mask) else {
                ctx.send(err_nosuchnick(&server, &nick, &mask));
                return Ok(());
            };

            // Show the first channel the caller shares with the target,
            // or a placeholder if there is none.
            let mut shown_channel = "*".to_string();
            let mut is_op = false;
            if let Some(session) = ctx.hub.session(ctx.uid) {
                let my_channels = session.read().await.channels().to_vec();
                for name in my_channels {
                    let Some(channel) = ctx.hub.channel(&name) else {
                        continue;
                    };
                    let guard = channel.read().await;
                    if guard.is_member(target) {
                        shown_channel = name;
                        is_op = guard.is_operator(target);
                        break;
                    }
                }
            }
            who_entry(ctx, &nick, &shown_channel, target, is_op).await;
        }

        ctx.reply(
            Response::RPL_ENDOFWHO,
            [nick.as_str(), mask.as_str(), "End of /WHO list"],
        );
        Ok(())
    }
}

/// WHO with no mask: everyone sharing a channel with the caller, each
/// listed once, flagged `@` if they are operator in any shared channel.
async fn who_visible(ctx: &mut Context<'_>, nick: &str) -> HandlerResult {
    let Some(session) = ctx.hub.session(ctx.uid) else {
        return Ok(());
    };
    let my_channels = session.read().await.channels().to_vec();

    let mut order: Vec<SessionId> = Vec::new();
    let mut op_anywhere: HashMap<SessionId, bool> = HashMap::new();
    for name in &my_channels {
        let Some(channel) = ctx.hub.channel(name) else {
            continue;
        };
        let guard = channel.read().await;
        for &member in guard.members() {
            let is_op = guard.is_operator(member);
            match op_anywhere.get_mut(&member) {
                Some(flag) => *flag = *flag || is_op,
                None => {
                    op_anywhere.insert(member, is_op);
                    order.push(member);
                }
            }
        }
    }

    for member in order {
        let is_op = op_anywhere.get(&member).copied().unwrap_or(false);
        who_entry(ctx, nick, "*", member, is_op).await;
    }
    ctx.reply(Response::RPL_ENDOFWHO, [nick, "*", "End of /WHO list"]);
    Ok(())
}

/// Emit one 352 line for a session.
async fn who_entry(
    ctx: &Context<'_>,
    nick: &str,
    channel_col: &str,
    target: SessionId,
    is_op: bool,
) {
    let Some(session) = ctx.hub.session(target) else {
        return;
    };
    let (target_nick, user, host, realname) = {
        let guard = session.read().await;
        (
            guard.nick.clone(),
            guard.user.clone(),
            guard.host.clone(),
            guard.realname.clone(),
        )
    };
    let flags = if is_op { "@H" } else { "H" };
    let hop_realname = format!("0 {}", realname);
    ctx.reply(
        Response::RPL_WHOREPLY,
        [
            nick,
            channel_col,
            user.as_str(),
            host.as_str(),
            ctx.hub.server_name.as_str(),
            target_nick.as_str(),
            flags,
            hop_realname.as_str(),
        ],
    );
}
