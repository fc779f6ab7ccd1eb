//! Registration completion and the welcome burst.

use super::super::Context;
use crate::error::HandlerResult;
use minirc_proto::Response;
use tracing::info;

/// Promote the session to registered if it can be.
///
/// Fires the instant nickname and username are both present on an
/// unregistered session: the supplied password must exactly match the
/// server password, otherwise the session gets 464 and stays unregistered
/// (it may retry by resending PASS/NICK/USER). On success the session
/// receives the 001-004 welcome burst.
pub async fn try_register(ctx: &mut Context<'_>) -> HandlerResult {
    let Some(session) = ctx.hub.session(ctx.uid) else {
        return Ok(());
    };

    let (nick, user, host, password) = {
        let guard = session.read().await;
        if guard.registered || !guard.has_identity() {
            return Ok(());
        }
        (
            guard.nick.clone(),
            guard.user.clone(),
            guard.host.clone(),
            guard.password.clone(),
        )
    };

    if password != ctx.hub.password() {
        info!(session = ctx.uid, nick = %nick, "Registration refused: bad password");
        ctx.reply(
            Response::ERR_PASSWDMISMATCH,
            [nick.as_str(), "Password incorrect"],
        );
        return Ok(());
    }

    session.write().await.registered = true;
    info!(session = ctx.uid, nick = %nick, user = %user, "Client registered");

    let server = ctx.hub.server_name.clone();
    let version = ctx.hub.version.clone();
    ctx.reply(
        Response::RPL_WELCOME,
        [
            nick.clone(),
            format!("Welcome to the Internet Relay Network {}!{}@{}", nick, user, host),
        ],
    );
    ctx.reply(
        Response::RPL_YOURHOST,
        [
            nick.clone(),
            format!("Your host is {}, running version {}", server, version),
        ],
    );
    ctx.reply(
        Response::RPL_CREATED,
        [
            nick.clone(),
            format!(
                "This server was created {}",
                ctx.hub.created.format("%a %b %e %Y at %H:%M:%S UTC")
            ),
        ],
    );
    ctx.reply(
        Response::RPL_MYINFO,
        [nick.as_str(), server.as_str(), version.as_str(), "o", "itkol"],
    );

    Ok(())
}
