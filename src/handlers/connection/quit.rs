//! QUIT command handler.

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use minirc_proto::Message;

/// Handler for QUIT. The actual teardown (notifying shared channels and
/// releasing state) runs in the connection loop, which reacts to the
/// `Quit` result.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let reason = msg
            .arg(0)
            .filter(|r| !r.is_empty())
            .unwrap_or("Client Quit");
        Err(HandlerError::Quit(Some(reason.to_string())))
    }
}
