//! Content-Length delimited request bodies.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::error::HttpError;

/// Default buffer size for body reads
const BUFFER_SIZE: usize = 8192;

pub struct BodyReader {
    expected: usize,
}

impl BodyReader {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    /// Completes the body starting from the bytes that arrived with the head.
    ///
    /// Bytes past `expected` are dropped; requests are strictly alternated
    /// with responses so nothing after the body is a valid next request.
    pub async fn read<S>(&self, stream: &mut S, buffered: BytesMut) -> Result<Vec<u8>, HttpError>
    where
        S: AsyncRead + Unpin,
    {
        let mut body = buffered;

        if body.len() >= self.expected {
            if body.len() > self.expected {
                tracing::debug!(
                    discarded = body.len() - self.expected,
                    "dropping bytes past declared body length"
                );
            }
            body.truncate(self.expected);
            return Ok(body.to_vec());
        }

        // Grow one read at a time; the declared length is never trusted
        // as an allocation size.
        while body.len() < self.expected {
            let step = (self.expected - body.len()).min(BUFFER_SIZE);
            body.reserve(step);
            let mut chunk = (&mut *stream).take(step as u64);
            let n = chunk.read_buf(&mut body).await?;

            if n == 0 {
                return Err(HttpError::PrematureDisconnect {
                    expected: self.expected,
                    received: body.len(),
                });
            }
        }

        Ok(body.to_vec())
    }
}
