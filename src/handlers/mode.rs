//! MODE command handler.
//!
//! Channel modes only; targets that are not channel names are ignored.
//! Flag characters are processed left to right, consuming one supplied
//! parameter per flag that takes one (`k` when adding, `o` always, `l`
//! when adding). Unknown flags produce one 472 each and processing
//! continues. Only changes that actually took effect are broadcast.

use super::{Context, Handler, err_chanoprivsneeded, err_nosuchchannel};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::{ChannelExt, Message, Prefix, Response};
use tracing::info;

/// One applied mode change: sign, flag character, optional parameter.
type Applied = (bool, char, Option<String>);

pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = ctx.require_registered().await?;
        let target = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;

        if !target.is_channel_name() {
            return Ok(());
        }

        let server = ctx.hub.server_name.clone();
        let Some(channel) = ctx.hub.channel(target) else {
            ctx.send(err_nosuchchannel(&server, &nick, target));
            return Ok(());
        };

        let Some(modes_str) = msg.arg(1) else {
            // Query: current flags plus key/limit parameters.
            let (flags, params) = channel.read().await.mode_string();
            let mut reply_params = vec![nick.clone(), target.to_string(), flags];
            reply_params.extend(params);
            ctx.reply(Response::RPL_CHANNELMODEIS, reply_params);
            return Ok(());
        };

        let supplied: Vec<&str> = msg.params.iter().skip(2).map(String::as_str).collect();
        let (applied, members) = {
            let mut guard = channel.write().await;
            if !guard.is_operator(ctx.uid) {
                drop(guard);
                ctx.send(err_chanoprivsneeded(&server, &nick, target));
                return Ok(());
            }

            let mut applied: Vec<Applied> = Vec::new();
            let mut adding = true;
            let mut param_index = 0;

            for flag in modes_str.chars() {
                match flag {
                    '+' => adding = true,
                    '-' => adding = false,
                    'i' => {
                        if guard.modes.invite_only != adding {
                            guard.modes.invite_only = adding;
                            applied.push((adding, 'i', None));
                        }
                    }
                    't' => {
                        if guard.modes.topic_restricted != adding {
                            guard.modes.topic_restricted = adding;
                            applied.push((adding, 't', None));
                        }
                    }
                    'k' => {
                        if adding {
                            let Some(key) = supplied.get(param_index) else {
                                continue;
                            };
                            param_index += 1;
                            if guard.modes.key.is_some() {
                                ctx.reply(
                                    Response::ERR_KEYSET,
                                    [nick.as_str(), target, "Channel key already set"],
                                );
                            } else {
                                guard.modes.key = Some(key.to_string());
                                applied.push((true, 'k', Some(key.to_string())));
                            }
                        } else if guard.modes.key.take().is_some() {
                            applied.push((false, 'k', None));
                        }
                    }
                    'o' => {
                        let Some(target_nick) = supplied.get(param_index) else {
                            continue;
                        };
                        param_index += 1;
                        // Absent or non-member targets are skipped; the
                        // parameter stays consumed.
                        let Some(target_id) = ctx.hub.find_by_nick(target_nick) else {
                            continue;
                        };
                        let changed = if adding {
                            guard.add_operator(target_id)
                        } else {
                            guard.remove_operator(target_id)
                        };
                        if changed {
                            guard.modes.oper_display = adding;
                            applied.push((adding, 'o', Some(target_nick.to_string())));
                        }
                    }
                    'l' => {
                        if adding {
                            let Some(raw) = supplied.get(param_index) else {
                                continue;
                            };
                            param_index += 1;
                            let Ok(limit) = raw.parse::<usize>() else {
                                continue;
                            };
                            if guard.modes.limit != limit {
                                guard.modes.limit = limit;
                                applied.push((true, 'l', Some(raw.to_string())));
                            }
                        } else if guard.modes.limit != 0 {
                            guard.modes.limit = 0;
                            applied.push((false, 'l', None));
                        }
                    }
                    unknown => {
                        ctx.reply(
                            Response::ERR_UNKNOWNMODE,
                            [
                                nick.clone(),
                                unknown.to_string(),
                                format!("is unknown mode char to me for {}", target),
                            ],
                        );
                    }
                }
            }

            (applied, guard.members().to_vec())
        };

        // A net-empty change set (including bare +/- runs) is not broadcast.
        if applied.is_empty() {
            return Ok(());
        }

        let (rendered, mode_params) = render_changes(&applied);
        let (user, host) = {
            let Some(session) = ctx.hub.session(ctx.uid) else {
                return Ok(());
            };
            let guard = session.read().await;
            (guard.user.clone(), guard.host.clone())
        };

        let mut params = vec![target.to_string(), rendered.clone()];
        params.extend(mode_params);
        let mode_msg = Message::new(Some(Prefix::new(&nick, &user, &host)), "MODE", params);
        ctx.hub.broadcast(&members, &mode_msg, None);

        info!(nick = %nick, channel = %target, changes = %rendered, "Modes changed");
        Ok(())
    }
}

/// Render applied changes as a mode string plus its parameters, grouping
/// consecutive same-sign flags, e.g. `+kl-i secret 5`.
fn render_changes(applied: &[Applied]) -> (String, Vec<String>) {
    let mut rendered = String::new();
    let mut params = Vec::new();
    let mut last_sign = None;

    for (sign, flag, param) in applied {
        if last_sign != Some(*sign) {
            rendered.push(if *sign { '+' } else { '-' });
            last_sign = Some(*sign);
        }
        rendered.push(*flag);
        if let Some(param) = param {
            params.push(param.clone());
        }
    }

    (rendered, params)
}
