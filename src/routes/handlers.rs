use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::chunked::ChunkedBody;
use crate::http::error::HttpError;
use crate::http::mime::mime_for;
use crate::http::request::{ContentLength, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

pub const INDEX_BODY: &str = "Halo's light";

/// Number of chunks emitted by the stream route.
pub const STREAM_CHUNKS: u32 = 10;

pub fn index() -> Response {
    Response::ok(INDEX_BODY)
}

/// Returns the request body verbatim.
pub fn echo(req: &Request) -> Result<Response, HttpError> {
    require_length(req)?;

    Ok(Response::ok(req.body.clone()))
}

pub async fn read_file(name: &str, root: &Path) -> Result<Response, HttpError> {
    let path = resolve_file(name, root)?;

    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(HttpError::NotFound),
        Err(e) => return Err(e.into()),
    };
    if !meta.is_file() {
        return Err(HttpError::NotFound);
    }

    let contents = match tokio::fs::read(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(HttpError::NotFound),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read file");
            return Err(e.into());
        }
    };

    Ok(ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", mime_for(name))
        .body(contents)
        .build())
}

/// Stores the request body under `root`, creating `root` if needed.
///
/// Writers to the same name are not serialised; the last one wins.
pub async fn write_file(name: &str, req: &Request, root: &Path) -> Result<Response, HttpError> {
    let path = resolve_file(name, root)?;
    require_length(req)?;

    tokio::fs::create_dir_all(root).await.inspect_err(|e| {
        tracing::error!(root = %root.display(), error = %e, "failed to create files root");
    })?;
    tokio::fs::write(&path, &req.body).await.inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to write file");
    })?;

    tracing::info!(path = %path.display(), bytes = req.body.len(), "file stored");
    Ok(Response::status_only(StatusCode::Created))
}

pub fn stream(interval: Duration) -> Response {
    ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .chunked(ChunkedBody::counter(STREAM_CHUNKS, interval))
        .build()
}

/// Rejects names that could leave `root`: empty, `..`, separators, NUL.
pub fn validate_file_name(name: &str) -> Result<(), HttpError> {
    let bad = name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if bad {
        return Err(HttpError::PathViolation(name.to_string()));
    }
    Ok(())
}

fn resolve_file(name: &str, root: &Path) -> Result<PathBuf, HttpError> {
    validate_file_name(name)?;
    Ok(root.join(name))
}

fn require_length(req: &Request) -> Result<usize, HttpError> {
    match req.content_length() {
        ContentLength::Valid(n) => Ok(n),
        ContentLength::Absent => Err(HttpError::MissingLength),
        ContentLength::Invalid => Err(HttpError::InvalidLength),
    }
}
