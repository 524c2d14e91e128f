use crate::http::request::{Headers, Method, Request};

pub const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Head is not valid UTF-8
    InvalidEncoding,
    /// Request line does not split into exactly three fields
    InvalidRequestLine,
    /// Anything other than HTTP/1.1
    UnsupportedVersion(String),
}

/// Request line and headers, before the body has been read.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: Headers,
}

impl RequestHead {
    pub fn into_request(self, body: Vec<u8>) -> Request {
        Request {
            method: self.method,
            path: self.path,
            version: self.version,
            headers: self.headers,
            body,
        }
    }
}

/// Parses a header block (everything before the blank line, without the
/// trailing `\r\n\r\n`).
///
/// Header lines lacking `": "` are skipped rather than rejected.
pub fn parse_request_head(head: &[u8]) -> Result<RequestHead, ParseError> {
    let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = head.split("\r\n");

    // Request line
    let request_line = lines.next().unwrap_or_default();
    let parts: Vec<&str> = request_line.split(' ').collect();
    let [method, path, version] = parts[..] else {
        return Err(ParseError::InvalidRequestLine);
    };

    if method.is_empty() || path.is_empty() {
        return Err(ParseError::InvalidRequestLine);
    }

    if version != HTTP_VERSION {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }

    // Headers
    let mut headers = Headers::new();

    for line in lines {
        if let Some((name, value)) = line.split_once(": ") {
            headers.insert(name, value);
        }
    }

    Ok(RequestHead {
        method: Method::from_token(method),
        path: path.to_string(),
        version: version.to_string(),
        headers,
    })
}

/// Offset of the `\r\n\r\n` terminator, if present.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
