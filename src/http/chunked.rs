//! Chunked transfer coding for streamed responses.

use std::fmt;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// The zero-length chunk that ends a chunked body (no trailers).
pub const TERMINATOR: &[u8] = b"0\r\n\r\n";

/// Lazy sequence of body segments, produced one at a time while writing.
pub struct ChunkedBody {
    chunks: Box<dyn Iterator<Item = Bytes> + Send>,
    interval: Duration,
}

impl ChunkedBody {
    /// `interval` is slept before every chunk after the first.
    pub fn new<I>(chunks: I, interval: Duration) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self {
            chunks: Box::new(chunks.into_iter()),
            interval,
        }
    }

    /// One chunk per integer in `1..=count`, as decimal text.
    pub fn counter(count: u32, interval: Duration) -> Self {
        Self::new((1..=count).map(|n| Bytes::from(n.to_string())), interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Iterator for ChunkedBody {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.chunks.next()
    }
}

impl fmt::Debug for ChunkedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedBody")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Appends one chunk (`<hex len>\r\n<data>\r\n`) to `buf`.
///
/// An empty payload would read as the terminator, so it encodes to nothing.
pub fn encode_chunk(data: &[u8], buf: &mut Vec<u8>) {
    if data.is_empty() {
        return;
    }
    buf.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
}

/// Writes every chunk of `body` followed by the terminator.
pub struct ChunkedWriter<'a, W> {
    writer: &'a mut W,
    chunks_written: usize,
}

impl<'a, W> ChunkedWriter<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            chunks_written: 0,
        }
    }

    /// Each chunk is flushed on its own so the peer sees it before the
    /// next delay starts. Returns the number of data chunks sent.
    pub async fn write_body(mut self, body: ChunkedBody) -> io::Result<usize> {
        let interval = body.interval();
        let mut frame = Vec::new();

        for chunk in body {
            if chunk.is_empty() {
                continue;
            }
            if self.chunks_written > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            frame.clear();
            encode_chunk(&chunk, &mut frame);
            self.writer.write_all(&frame).await?;
            self.writer.flush().await?;
            self.chunks_written += 1;

            tracing::trace!(chunk = self.chunks_written, len = chunk.len(), "chunk sent");
        }

        self.writer.write_all(TERMINATOR).await?;
        self.writer.flush().await?;

        Ok(self.chunks_written)
    }
}
