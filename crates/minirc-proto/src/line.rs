//! CRLF line framing for tokio.
//!
//! The decoder accumulates raw bytes and yields complete lines with the
//! CR-LF delimiter stripped; partial data stays buffered for the next read.
//! A line that exceeds [`MAX_LINE_LEN`] before its delimiter arrives is a
//! fatal protocol error, so a peer that never sends the delimiter cannot
//! grow the buffer without bound.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::message::Message;

/// Maximum accepted line length in bytes, including the delimiter.
pub const MAX_LINE_LEN: usize = 512;

/// Line-based codec: decodes CRLF-terminated lines, encodes [`Message`]s.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Index of the next byte to scan for the delimiter.
    next_index: usize,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let mut line = src.split_to(self.next_index + offset);
            src.advance(1); // the newline itself
            self.next_index = 0;

            if line.len() + 1 > MAX_LINE_LEN {
                return Err(ProtocolError::MessageTooLong {
                    actual: line.len() + 1,
                    limit: MAX_LINE_LEN,
                });
            }
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            let data = std::str::from_utf8(&line)
                .map_err(|e| ProtocolError::InvalidUtf8 {
                    byte_pos: e.valid_up_to(),
                })?
                .to_string();
            Ok(Some(data))
        } else {
            // No complete line yet; remember where the scan stopped.
            self.next_index = src.len();
            if src.len() > MAX_LINE_LEN {
                return Err(ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: MAX_LINE_LEN,
                });
            }
            Ok(None)
        }
    }
}

impl Encoder<Message> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        dst.extend_from_slice(msg.to_string().as_bytes());
        Ok(())
    }
}
