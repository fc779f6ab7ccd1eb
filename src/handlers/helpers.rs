//! Common reply builders shared across handlers.

use minirc_proto::{Message, Response};

/// Create a server-prefixed numeric reply.
pub fn server_reply<P>(server_name: &str, response: Response, params: P) -> Message
where
    P: IntoIterator,
    P::Item: Into<String>,
{
    Message::reply(server_name, response, params)
}

/// 401 - no such nick/channel.
pub fn err_nosuchnick(server_name: &str, nick: &str, target: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOSUCHNICK,
        [nick, target, "No such nick/channel"],
    )
}

/// 403 - no such channel.
pub fn err_nosuchchannel(server_name: &str, nick: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOSUCHCHANNEL,
        [nick, channel, "No such channel"],
    )
}

/// 442 - you're not on that channel.
pub fn err_notonchannel(server_name: &str, nick: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOTONCHANNEL,
        [nick, channel, "You're not on that channel"],
    )
}

/// 482 - you're not channel operator.
pub fn err_chanoprivsneeded(server_name: &str, nick: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_CHANOPRIVSNEEDED,
        [nick, channel, "You're not channel operator"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reply_shapes() {
        assert_eq!(
            err_nosuchchannel("irc.local", "alice", "#gone").to_string(),
            ":irc.local 403 alice #gone :No such channel\r\n"
        );
        assert_eq!(
            err_chanoprivsneeded("irc.local", "alice", "#chat").to_string(),
            ":irc.local 482 alice #chat :You're not channel operator\r\n"
        );
    }
}
