//! Request routing.
//!
//! [`router::Route`] maps a method and path to one of a fixed set of
//! resources; [`handlers`] holds one function per resource. Handlers return
//! `Result<Response, HttpError>` and leave the error-to-response mapping to
//! the connection.

pub mod handlers;
pub mod router;

pub use router::{Route, route};
