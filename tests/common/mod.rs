//! Client-side helpers shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use halo::config::Config;
use halo::http::connection::Connection;
use tokio::io::{AsyncRead, AsyncReadExt, DuplexStream};
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct ParsedResponse {
    pub status: u16,
    pub reason: String,
    /// Lower-cased names
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Decoded chunk payloads, empty unless the response was chunked
    pub chunks: Vec<Vec<u8>>,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }
}

pub fn unique_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("halo-{}-{}-{}", tag, std::process::id(), nanos))
}

pub fn test_config(files_root: PathBuf) -> Config {
    Config {
        files_root,
        idle_timeout_ms: 2_000,
        stream_interval_ms: 0,
        ..Config::default()
    }
}

/// Spawns a connection over an in-memory pipe and returns the client end.
pub fn spawn_connection(cfg: Config) -> (DuplexStream, JoinHandle<anyhow::Result<()>>) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(Connection::new(server, Arc::new(cfg)).run());
    (client, handle)
}

async fn fill<S: AsyncRead + Unpin>(stream: &mut S, buf: &mut Vec<u8>) -> bool {
    let mut tmp = [0u8; 1024];
    let n = stream.read(&mut tmp).await.unwrap();
    buf.extend_from_slice(&tmp[..n]);
    n > 0
}

fn find(buf: &[u8], needle: &[u8]) -> Option<usize> {
    buf.windows(needle.len()).position(|w| w == needle)
}

/// Reads one response, leaving any following bytes in `buf`.
///
/// Returns `None` if the stream ends before a status line arrives.
pub async fn read_response<S: AsyncRead + Unpin>(
    stream: &mut S,
    buf: &mut Vec<u8>,
) -> Option<ParsedResponse> {
    let head_end = loop {
        if let Some(pos) = find(buf, b"\r\n\r\n") {
            break pos;
        }
        if !fill(stream, buf).await {
            return None;
        }
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    buf.drain(..head_end + 4);

    let mut lines = head.split("\r\n");
    let mut status_line = lines.next().unwrap().splitn(3, ' ');
    assert_eq!(status_line.next(), Some("HTTP/1.1"));
    let status: u16 = status_line.next().unwrap().parse().unwrap();
    let reason = status_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(": "))
        .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
        .collect();

    let mut body = Vec::new();
    let mut chunks = Vec::new();

    if headers.get("transfer-encoding").map(String::as_str) == Some("chunked") {
        loop {
            let line_end = loop {
                if let Some(pos) = find(buf, b"\r\n") {
                    break pos;
                }
                assert!(fill(stream, buf).await, "eof inside chunk size line");
            };
            let size_line = String::from_utf8(buf[..line_end].to_vec()).unwrap();
            let size = usize::from_str_radix(&size_line, 16).unwrap();
            buf.drain(..line_end + 2);

            while buf.len() < size + 2 {
                assert!(fill(stream, buf).await, "eof inside chunk data");
            }
            assert_eq!(&buf[size..size + 2], b"\r\n");
            let data: Vec<u8> = buf.drain(..size + 2).take(size).collect();

            if size == 0 {
                break;
            }
            body.extend_from_slice(&data);
            chunks.push(data);
        }
    } else {
        let len: usize = headers
            .get("content-length")
            .expect("response without length")
            .parse()
            .unwrap();
        while buf.len() < len {
            assert!(fill(stream, buf).await, "eof inside body");
        }
        body = buf.drain(..len).collect();
    }

    Some(ParsedResponse {
        status,
        reason,
        headers,
        body,
        chunks,
    })
}

/// True once the peer has closed; fails if it sends anything instead.
pub async fn expect_eof<S: AsyncRead + Unpin>(stream: &mut S) -> bool {
    let mut tmp = [0u8; 64];
    matches!(stream.read(&mut tmp).await, Ok(0))
}
