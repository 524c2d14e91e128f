//! Request-scoped failures and their HTTP mapping.

use thiserror::Error;

use crate::http::parser::ParseError;
use crate::http::response::StatusCode;

/// Everything that can go wrong while handling one exchange.
///
/// All variants are recovered at the connection loop and turned into a
/// response; only socket I/O failures escape as `anyhow` errors.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("malformed request: {0:?}")]
    Malformed(ParseError),

    #[error("request head exceeds {limit} bytes")]
    HeaderTooLarge { limit: usize },

    #[error("Content-Length header required")]
    MissingLength,

    #[error("invalid Content-Length header")]
    InvalidLength,

    #[error("declared body of {declared} bytes exceeds {limit}")]
    BodyTooLarge { declared: usize, limit: usize },

    #[error("peer closed after {received} of {expected} body bytes")]
    PrematureDisconnect { expected: usize, received: usize },

    #[error("invalid file name {0:?}")]
    PathViolation(String),

    #[error("not found")]
    NotFound,

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Malformed(_)
            | HttpError::HeaderTooLarge { .. }
            | HttpError::MissingLength
            | HttpError::InvalidLength
            | HttpError::BodyTooLarge { .. }
            | HttpError::PrematureDisconnect { .. }
            | HttpError::PathViolation(_) => StatusCode::BadRequest,
            HttpError::NotFound => StatusCode::NotFound,
            HttpError::Io(_) => StatusCode::InternalServerError,
        }
    }

    /// Whether the byte stream can no longer be trusted to line up with
    /// the next request once this error has been answered.
    pub fn closes_connection(&self) -> bool {
        matches!(
            self,
            HttpError::Malformed(_)
                | HttpError::HeaderTooLarge { .. }
                | HttpError::InvalidLength
                | HttpError::BodyTooLarge { .. }
                | HttpError::PrematureDisconnect { .. }
        )
    }
}

impl From<ParseError> for HttpError {
    fn from(e: ParseError) -> Self {
        HttpError::Malformed(e)
    }
}
