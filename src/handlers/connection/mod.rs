//! Connection and registration handlers: PASS, NICK, USER, QUIT, CAP.

mod nick;
mod pass;
mod quit;
mod user;
mod welcome;

pub use nick::NickHandler;
pub use pass::PassHandler;
pub use quit::QuitHandler;
pub use user::UserHandler;
pub use welcome::try_register;

use super::{Context, Handler};
use crate::error::HandlerResult;
use async_trait::async_trait;
use minirc_proto::Message;

/// CAP negotiation is not supported; the command is accepted as a no-op so
/// that clients which open with `CAP LS` can still register.
pub struct CapHandler;

#[async_trait]
impl Handler for CapHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        Ok(())
    }
}
