use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::Config;
use crate::http::body::BodyReader;
use crate::http::error::HttpError;
use crate::http::framer::{Framed, RequestFramer};
use crate::http::parser::{RequestHead, parse_request_head};
use crate::http::request::{ContentLength, Request, content_length};
use crate::http::response::Response;
use crate::http::writer::{ResponseWriter, WriteError};
use crate::routes;

/// One client connection, driven until it closes.
///
/// Generic over the byte stream so it runs on a `TcpStream` in production
/// and on an in-memory duplex in tests.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    config: Arc<Config>,
    framer: RequestFramer,
    state: ConnectionState,
    exchanges: usize,
}

pub enum ConnectionState {
    AwaitingRequest,
    ParsingHeaders(Framed),
    ReadingBody {
        head: RequestHead,
        buffered: BytesMut,
        length: usize,
    },
    Dispatching(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        let framer = RequestFramer::new(config.max_header_bytes);
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            config,
            framer,
            state: ConnectionState::AwaitingRequest,
            exchanges: 0,
        }
    }

    /// Serves requests until the connection closes.
    ///
    /// Consumes the connection, so the stream is shut down and released
    /// exactly once whichever way the loop ends. Only socket I/O failures
    /// come back as errors.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(error = %e, "shutdown after close failed");
        }
        tracing::debug!(exchanges = self.exchanges, "connection closed");

        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitingRequest => self.await_request().await?,
                ConnectionState::ParsingHeaders(framed) => self.parse_headers(framed),
                ConnectionState::ReadingBody {
                    head,
                    buffered,
                    length,
                } => self.read_body(head, buffered, length).await?,
                ConnectionState::Dispatching(req) => self.dispatch(req).await,
                ConnectionState::Writing(writer, keep_alive) => {
                    self.write(writer, keep_alive).await?
                }
                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn await_request(&mut self) -> anyhow::Result<ConnectionState> {
        let idle = self.config.idle_timeout();
        let next = self.framer.next_head(&mut self.stream, &mut self.buffer);

        match timeout(idle, next).await {
            Err(_) => {
                tracing::debug!(idle_ms = idle.as_millis() as u64, "idle timeout, closing");
                Ok(ConnectionState::Closed)
            }
            Ok(Ok(None)) => Ok(ConnectionState::Closed),
            Ok(Ok(Some(framed))) => Ok(ConnectionState::ParsingHeaders(framed)),
            Ok(Err(HttpError::Io(e))) => Err(self.fail(e).await),
            Ok(Err(e)) => Ok(self.reject(e)),
        }
    }

    fn parse_headers(&self, framed: Framed) -> ConnectionState {
        let head = match parse_request_head(&framed.head) {
            Ok(head) => head,
            Err(e) => return self.reject(e.into()),
        };

        match content_length(&head.headers) {
            ContentLength::Invalid => self.reject(HttpError::InvalidLength),
            ContentLength::Valid(length) if length > self.config.max_body_bytes => {
                self.reject(HttpError::BodyTooLarge {
                    declared: length,
                    limit: self.config.max_body_bytes,
                })
            }
            ContentLength::Valid(length) if length > 0 => ConnectionState::ReadingBody {
                head,
                buffered: framed.rest,
                length,
            },
            _ => {
                if !framed.rest.is_empty() {
                    tracing::debug!(
                        discarded = framed.rest.len(),
                        "dropping bytes after body-less request"
                    );
                }
                ConnectionState::Dispatching(head.into_request(Vec::new()))
            }
        }
    }

    async fn read_body(
        &mut self,
        head: RequestHead,
        buffered: BytesMut,
        length: usize,
    ) -> anyhow::Result<ConnectionState> {
        match BodyReader::new(length).read(&mut self.stream, buffered).await {
            Ok(body) => Ok(ConnectionState::Dispatching(head.into_request(body))),
            Err(HttpError::Io(e)) => Err(self.fail(e).await),
            Err(e) => Ok(self.reject(e)),
        }
    }

    async fn dispatch(&mut self, req: Request) -> ConnectionState {
        let mut keep_alive = req.keep_alive();

        let mut response = match routes::route(&req, &self.config).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(method = %req.method, path = %req.path, error = %e, "request failed");
                if e.closes_connection() {
                    keep_alive = false;
                }
                Response::status_only(e.status())
            }
        };

        tracing::info!(
            method = %req.method,
            path = %req.path,
            status = response.status.as_u16(),
            body_len = response.body.as_bytes().map(<[u8]>::len),
            keep_alive,
            "request handled"
        );

        response.set_header("Connection", connection_value(keep_alive));
        ConnectionState::Writing(ResponseWriter::new(response), keep_alive)
    }

    async fn write(
        &mut self,
        writer: ResponseWriter,
        keep_alive: bool,
    ) -> anyhow::Result<ConnectionState> {
        match writer.write_to_stream(&mut self.stream).await {
            Ok(()) => {
                self.exchanges += 1;
                if keep_alive {
                    Ok(ConnectionState::AwaitingRequest) // go back for next request
                } else {
                    Ok(ConnectionState::Closed)
                }
            }
            Err(WriteError::StreamAborted(e)) => {
                tracing::debug!(error = %e, "client went away during chunked response");
                Ok(ConnectionState::Closed)
            }
            Err(e @ WriteError::Response(_)) => Err(e.into()),
        }
    }

    /// Answers a request-level failure and closes afterwards.
    fn reject(&self, err: HttpError) -> ConnectionState {
        tracing::warn!(error = %err, status = err.status().as_u16(), "rejecting request");

        let mut response = Response::status_only(err.status());
        response.set_header("Connection", connection_value(false));
        ConnectionState::Writing(ResponseWriter::new(response), false)
    }

    /// Socket read failure: nothing has been written for this exchange yet,
    /// so try a 500 before giving up on the stream.
    async fn fail(&mut self, err: io::Error) -> anyhow::Error {
        let mut response = Response::internal_error();
        response.set_header("Connection", connection_value(false));

        if let Err(e) = ResponseWriter::new(response)
            .write_to_stream(&mut self.stream)
            .await
        {
            tracing::trace!(error = %e, "best-effort 500 not delivered");
        }

        anyhow::Error::new(err).context("reading from client")
    }
}

fn connection_value(keep_alive: bool) -> &'static str {
    if keep_alive { "keep-alive" } else { "close" }
}
