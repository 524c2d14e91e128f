//! Accumulates bytes until a complete request head is available.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::error::HttpError;
use crate::http::parser::find_headers_end;

const READ_CHUNK: usize = 4096;

/// A header block split off the receive buffer.
#[derive(Debug)]
pub struct Framed {
    /// Request line and headers, terminator excluded
    pub head: Bytes,
    /// Body bytes that arrived together with the head
    pub rest: BytesMut,
}

pub struct RequestFramer {
    max_header_bytes: usize,
}

impl RequestFramer {
    pub fn new(max_header_bytes: usize) -> Self {
        Self { max_header_bytes }
    }

    /// Reads until `\r\n\r\n` is in `buffer`.
    ///
    /// Returns `Ok(None)` when the peer closes before a full head arrived.
    /// Bytes already in `buffer` are examined before any read.
    pub async fn next_head<S>(
        &self,
        stream: &mut S,
        buffer: &mut BytesMut,
    ) -> Result<Option<Framed>, HttpError>
    where
        S: AsyncRead + Unpin,
    {
        // Offset already scanned; rescan 3 bytes back so a terminator split
        // across two reads is still found.
        let mut scanned = 0;

        loop {
            if let Some(pos) = find_headers_end(&buffer[scanned..]) {
                let end = scanned + pos;
                let mut head = buffer.split_to(end + 4);
                head.truncate(end);
                let rest = buffer.split();

                tracing::trace!(head_len = end, buffered_body = rest.len(), "request head framed");
                return Ok(Some(Framed {
                    head: head.freeze(),
                    rest,
                }));
            }

            if buffer.len() > self.max_header_bytes {
                return Err(HttpError::HeaderTooLarge {
                    limit: self.max_header_bytes,
                });
            }

            scanned = buffer.len().saturating_sub(3);

            buffer.reserve(READ_CHUNK);
            let n = stream.read_buf(buffer).await?;
            if n == 0 {
                if !buffer.is_empty() {
                    tracing::debug!(pending = buffer.len(), "peer closed mid-head");
                }
                return Ok(None);
            }
        }
    }
}
