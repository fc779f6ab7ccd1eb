//! IRC wire protocol support for minircd.
//!
//! This crate covers the protocol layer only: parsing and serializing
//! messages, the numeric reply set the server emits, the CRLF line-framing
//! codec, and nickname/channel-name validation. It knows nothing about
//! sessions, channels, or routing.

pub mod chan;
pub mod error;
pub mod line;
pub mod message;
pub mod nick;
pub mod prefix;
pub mod response;

pub use chan::ChannelExt;
pub use error::{ParseError, ProtocolError};
pub use line::LineCodec;
pub use message::Message;
pub use nick::NickExt;
pub use prefix::Prefix;
pub use response::Response;
