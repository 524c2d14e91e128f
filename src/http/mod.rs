//! HTTP/1.1 protocol implementation.
//!
//! Framing is done by hand: requests carry `Content-Length` delimited
//! bodies, responses are either fully buffered or streamed with chunked
//! transfer coding.
//!
//! # Architecture
//!
//! - **`framer`**: accumulates bytes until a complete request head arrives
//! - **`parser`**: turns the head into a request line and headers
//! - **`body`**: reads exactly `Content-Length` body bytes
//! - **`request`** / **`response`**: message types
//! - **`chunked`**: chunked transfer coding for streamed bodies
//! - **`writer`**: serializes and writes responses
//! - **`connection`**: the per-connection state machine
//! - **`mime`**: extension to MIME type table
//! - **`error`**: request-scoped failures and their status codes
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingRequest  │ ← idle timeout armed; expiry → Closed
//!        └──────┬───────────┘
//!               │ head complete
//!               ▼
//!        ┌──────────────────┐
//!        │ ParsingHeaders   │ ← malformed → 400 + close
//!        └──────┬───────────┘
//!               │ Content-Length > 0
//!               ▼
//!        ┌──────────────────┐
//!        │  ReadingBody     │ ← peer gone mid-body → 400 + close
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │  Dispatching     │ ← route to handler
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → AwaitingRequest (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use halo::config::Config;
//! use halo::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::default());
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let config = config.clone();
//!         tokio::spawn(async move {
//!             if let Err(e) = Connection::new(socket, config).run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod body;
pub mod chunked;
pub mod connection;
pub mod error;
pub mod framer;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
