//! Framing codec for the AMI wire protocol.
//!
//! [`AmiCodec`] splits the inbound byte stream into complete message texts
//! delimited by a blank line (`\r\n\r\n`) and encodes outbound actions back
//! into wire text. It plugs into `tokio_util`'s [`FramedRead`] and
//! [`FramedWrite`] like any other codec.
//!
//! The protocol has no length prefix, so the only defence against a
//! desynchronized or malicious peer is a ceiling on how many bytes may be
//! buffered while waiting for a delimiter. Exceeding [`MAX_BUFFER_SIZE`]
//! clears the buffer and surfaces a [`FramingError`]; the session treats
//! that as unrecoverable and tears the transport down.
//!
//! [`FramedRead`]: tokio_util::codec::FramedRead
//! [`FramedWrite`]: tokio_util::codec::FramedWrite

use std::io;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use crate::action::Action;

/// Maximum bytes buffered while waiting for a message delimiter (1 MiB).
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

const END_OF_MESSAGE: &[u8] = b"\r\n\r\n";

/// Errors produced by the framing layer.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The receive buffer grew past the ceiling without a delimiter. The
    /// stream is desynchronized and the buffer has been discarded.
    #[error("receive buffer exceeded {max} bytes without a message delimiter")]
    BufferOverflow {
        /// Configured buffer ceiling in bytes.
        max: usize,
    },
}

impl From<FramingError> for io::Error {
    fn from(err: FramingError) -> Self { io::Error::new(io::ErrorKind::InvalidData, err) }
}

/// Codec framing AMI messages on the blank-line delimiter.
///
/// Decoding yields the text of each complete message with the delimiter
/// stripped. Extraneous `\r`/`\n` bytes between messages are tolerated and
/// skipped, but only after a delimiter has been seen, so feeding the codec
/// byte-by-byte extracts exactly the same messages as feeding it one chunk.
pub struct AmiCodec {
    max_buffer: usize,
    skip_separators: bool,
}

impl AmiCodec {
    /// Create a codec with the default [`MAX_BUFFER_SIZE`] ceiling.
    #[must_use]
    pub fn new() -> Self { Self::with_max_buffer(MAX_BUFFER_SIZE) }

    /// Create a codec with a custom buffer ceiling.
    #[must_use]
    pub fn with_max_buffer(max_buffer: usize) -> Self {
        Self {
            max_buffer,
            skip_separators: false,
        }
    }

    /// Return the configured buffer ceiling.
    #[must_use]
    pub fn max_buffer(&self) -> usize { self.max_buffer }

    fn discard_separators(src: &mut BytesMut) {
        while matches!(src.first(), Some(b'\r' | b'\n')) {
            src.advance(1);
        }
    }
}

impl Default for AmiCodec {
    fn default() -> Self { Self::new() }
}

impl Decoder for AmiCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() > self.max_buffer {
            let size = src.len();
            src.clear();
            tracing::error!(size, max = self.max_buffer, "receive buffer overflow, resetting");
            return Err(FramingError::BufferOverflow { max: self.max_buffer }.into());
        }

        if self.skip_separators {
            Self::discard_separators(src);
            self.skip_separators = src.is_empty();
        }

        if let Some(pos) = src.windows(END_OF_MESSAGE.len()).position(|w| w == END_OF_MESSAGE) {
            let raw = src.split_to(pos);
            src.advance(END_OF_MESSAGE.len());
            Self::discard_separators(src);
            self.skip_separators = src.is_empty();
            return Ok(Some(String::from_utf8_lossy(&raw).into_owned()));
        }

        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }
        // A trailing partial message at end of stream is unusable; discard
        // it rather than erroring, the session reports the EOF itself.
        if !src.is_empty() {
            tracing::debug!(len = src.len(), "discarding partial message at end of stream");
            src.clear();
        }
        Ok(None)
    }
}

impl<'a> Encoder<&'a Action> for AmiCodec {
    type Error = io::Error;

    fn encode(&mut self, action: &'a Action, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let text = action.marshall();
        dst.reserve(text.len());
        dst.extend_from_slice(text.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
