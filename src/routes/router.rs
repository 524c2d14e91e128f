use crate::config::Config;
use crate::http::error::HttpError;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::routes::handlers;

pub const FILES_PREFIX: &str = "/files/";
pub const STREAM_PATH: &str = "/stream";

/// Every behaviour the server knows, matched in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// `GET /`
    Index,
    /// `POST` to one of the configured echo paths
    Echo,
    /// `GET /files/<name>`, name not yet validated
    ReadFile(&'a str),
    /// `POST /files/<name>`, name not yet validated
    WriteFile(&'a str),
    /// `GET /stream`
    Stream,
    NotFound,
}

impl<'a> Route<'a> {
    pub fn resolve(method: &Method, path: &'a str, cfg: &Config) -> Self {
        match (method, path) {
            (Method::GET, "/") => Route::Index,
            (Method::POST, p) if cfg.is_echo_route(p) => Route::Echo,
            (Method::GET, p) if p.starts_with(FILES_PREFIX) => {
                Route::ReadFile(&p[FILES_PREFIX.len()..])
            }
            (Method::POST, p) if p.starts_with(FILES_PREFIX) => {
                Route::WriteFile(&p[FILES_PREFIX.len()..])
            }
            (Method::GET, STREAM_PATH) => Route::Stream,
            _ => Route::NotFound,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Index => "index",
            Route::Echo => "echo",
            Route::ReadFile(_) => "read_file",
            Route::WriteFile(_) => "write_file",
            Route::Stream => "stream",
            Route::NotFound => "not_found",
        }
    }
}

/// Runs the handler matching `req`.
pub async fn route(req: &Request, cfg: &Config) -> Result<Response, HttpError> {
    let route = Route::resolve(&req.method, &req.path, cfg);
    tracing::debug!(route = route.name(), method = %req.method, path = %req.path, "dispatching");

    match route {
        Route::Index => Ok(handlers::index()),
        Route::Echo => handlers::echo(req),
        Route::ReadFile(name) => handlers::read_file(name, &cfg.files_root).await,
        Route::WriteFile(name) => handlers::write_file(name, req, &cfg.files_root).await,
        Route::Stream => Ok(handlers::stream(cfg.stream_interval())),
        Route::NotFound => Err(HttpError::NotFound),
    }
}
