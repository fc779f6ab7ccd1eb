//! Protocol-layer error types.

use thiserror::Error;

/// Errors produced while parsing a single message line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,
    #[error("prefix present but missing command")]
    MissingCommand,
}

/// Errors produced by the transport codec.
///
/// All of these are fatal to the connection they occur on; none of them are
/// recoverable by reading more bytes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("line exceeds maximum length ({actual} > {limit} bytes)")]
    MessageTooLong { actual: usize, limit: usize },

    #[error("invalid UTF-8 at byte {byte_pos}")]
    InvalidUtf8 { byte_pos: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
