use std::io;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::chunked::ChunkedWriter;
use crate::http::parser::HTTP_VERSION;
use crate::http::response::{Body, Response};

#[derive(Debug, Error)]
pub enum WriteError {
    /// Nothing usable reached the client.
    #[error("failed to write response: {0}")]
    Response(#[source] io::Error),
    /// Head went out, then the peer stopped accepting chunks.
    #[error("stream aborted after headers: {0}")]
    StreamAborted(#[source] io::Error),
}

/// Status line, headers and the blank line.
///
/// Headers are emitted in name order so output is stable.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    let mut headers: Vec<_> = resp.headers.iter().collect();
    headers.sort();

    for (k, v) in headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    body: Body,
}

impl ResponseWriter {
    /// Buffered bodies are appended to the head so they go out as one unit.
    pub fn new(response: Response) -> Self {
        let mut buffer = serialize_head(&response);
        let body = match response.body {
            Body::Full(bytes) => {
                buffer.extend_from_slice(&bytes);
                Body::Full(Vec::new())
            }
            chunked => chunked,
        };
        Self { buffer, body }
    }

    pub async fn write_to_stream<W>(self, stream: &mut W) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        stream
            .write_all(&self.buffer)
            .await
            .map_err(WriteError::Response)?;
        stream.flush().await.map_err(WriteError::Response)?;

        if let Body::Chunked(chunks) = self.body {
            let sent = ChunkedWriter::new(stream)
                .write_body(chunks)
                .await
                .map_err(WriteError::StreamAborted)?;
            tracing::debug!(chunks = sent, "chunked body complete");
        }

        Ok(())
    }
}
