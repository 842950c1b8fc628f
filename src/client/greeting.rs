//! Reading and validating the server greeting.
//!
//! An AMI server opens with a single line such as
//! `Asterisk Call Manager/5.0.2` followed by CRLF, before any protocol
//! messages. The read is bounded and may pull in bytes past the line
//! terminator; those are returned for replay through
//! [`RewindStream`](crate::rewind_stream::RewindStream).

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

pub(crate) const MAX_GREETING_LEN: usize = 1024;

const GREETING_PATTERN: &str = "Asterisk Call Manager/";

#[derive(Debug, Error)]
pub(crate) enum GreetingError {
    /// No line terminator within the length bound; whatever was received is
    /// carried along for diagnostics.
    #[error("greeting exceeded {MAX_GREETING_LEN} bytes without a line terminator")]
    TooLong { received: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Whether a greeting line identifies an AMI endpoint.
///
/// The check is a substring match, not anchored: historical servers prefix
/// the banner with distribution identifiers.
pub(crate) fn is_ami_greeting(line: &str) -> bool { line.contains(GREETING_PATTERN) }

/// Read the single greeting line, returning it with any leftover bytes
/// read past the terminator.
pub(crate) async fn read_greeting<R>(reader: &mut R) -> Result<(String, Vec<u8>), GreetingError>
where
    R: AsyncRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0_u8; 256];

    loop {
        if let Some(pos) = buf.windows(2).position(|w| w == b"\r\n") {
            let leftover = buf.split_off(pos + 2);
            buf.truncate(pos);
            let line = String::from_utf8_lossy(&buf).into_owned();
            return Ok((line, leftover));
        }

        if buf.len() > MAX_GREETING_LEN {
            return Err(GreetingError::TooLong {
                received: String::from_utf8_lossy(&buf).into_owned(),
            });
        }

        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Err(GreetingError::Io(io::ErrorKind::UnexpectedEof.into()));
        }
        buf.extend_from_slice(&chunk[..read]);
    }
}
