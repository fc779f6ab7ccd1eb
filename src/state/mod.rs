//! Server state: sessions, channels, and the hub that owns them.

mod channel;
mod hub;
mod session;

pub use channel::{Channel, ChannelModes, JoinDenied, Topic};
pub use hub::{Hub, OUTBOUND_QUEUE};
pub use session::{Session, SessionId};
