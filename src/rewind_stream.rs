//! Async read adapter that replays leftover bytes.
//!
//! Reading the connection greeting may pull in the first bytes of the
//! following protocol messages. `RewindStream` yields those buffered bytes
//! first, then delegates to the underlying reader, so the framed pipeline
//! sees an unbroken stream.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, ReadBuf};

/// A read adapter that yields `leftover` before reading from `inner`.
pub struct RewindStream<R> {
    leftover: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R> RewindStream<R> {
    /// Create a `RewindStream` that replays `leftover` before delegating
    /// to `inner`.
    pub fn new(leftover: Vec<u8>, inner: R) -> Self {
        Self {
            leftover,
            pos: 0,
            inner,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for RewindStream<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.pos < self.leftover.len() {
            let remaining = self.leftover.len() - self.pos;
            let to_copy = remaining.min(buf.remaining());
            if to_copy > 0 {
                let start = self.pos;
                let Some(slice) = self.leftover.get(start..start + to_copy) else {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "rewind buffer slice out of bounds",
                    )));
                };
                buf.put_slice(slice);
                self.pos += to_copy;
                return Poll::Ready(Ok(()));
            }
        }

        if self.pos >= self.leftover.len() && !self.leftover.is_empty() {
            self.leftover.clear();
            self.pos = 0;
        }

        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<R: Unpin> Unpin for RewindStream<R> {}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn replays_leftover_before_inner_stream() {
        let inner: &[u8] = b" world";
        let mut stream = RewindStream::new(b"hello".to_vec(), inner);

        let mut out = String::new();
        stream
            .read_to_string(&mut out)
            .await
            .expect("read to string");

        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn empty_leftover_delegates_immediately() {
        let inner: &[u8] = b"data";
        let mut stream = RewindStream::new(Vec::new(), inner);

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.expect("read to end");

        assert_eq!(out, b"data");
    }

    #[tokio::test]
    async fn small_destination_buffers_drain_leftover_in_pieces() {
        let inner: &[u8] = b"cd";
        let mut stream = RewindStream::new(b"ab".to_vec(), inner);

        let mut byte = [0_u8; 1];
        let mut out = Vec::new();
        for _ in 0..4 {
            stream.read_exact(&mut byte).await.expect("read byte");
            out.push(byte[0]);
        }

        assert_eq!(out, b"abcd");
    }
}
