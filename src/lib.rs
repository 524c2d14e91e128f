//! Halo - a small HTTP/1.1 server with hand-rolled framing.
//!
//! Core library: protocol handling, routing, configuration and the
//! listener that spawns one task per connection.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
