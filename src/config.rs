use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Server configuration.
///
/// Every field has a default, so an empty YAML document is valid.
///
/// ```yaml
/// listen_addr: "0.0.0.0:8080"
/// files_root: /srv/halo/files
/// idle_timeout_ms: 5000
/// echo_routes: ["/echo"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Directory served and written by the `/files/<name>` routes
    pub files_root: PathBuf,
    /// How long a connection may sit idle waiting for the next request head
    pub idle_timeout_ms: u64,
    /// Upper bound on a buffered request head
    pub max_header_bytes: usize,
    /// Largest `Content-Length` accepted before the body is read
    pub max_body_bytes: usize,
    /// Delay between chunks of the `/stream` route
    pub stream_interval_ms: u64,
    /// POST paths that echo the request body back
    pub echo_routes: Vec<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            files_root: PathBuf::from("files"),
            idle_timeout_ms: 10_000,
            max_header_bytes: 64 * 1024,
            max_body_bytes: 16 * 1024 * 1024,
            stream_interval_ms: 1_000,
            echo_routes: vec!["/echo".to_string(), "/halo".to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `$HALO_CONFIG` if set, then applies the `LISTEN` and
    /// `FILES_ROOT` overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("HALO_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&raw).with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.listen_addr = listen_addr;
        }
        if let Ok(root) = std::env::var("FILES_ROOT") {
            cfg.files_root = PathBuf::from(root);
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        // serde_yaml rejects an empty document outright
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(raw)?;
        cfg.tracing_level()?;
        Ok(cfg)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    pub fn is_echo_route(&self, path: &str) -> bool {
        self.echo_routes.iter().any(|r| r == path)
    }

    pub fn tracing_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .with_context(|| format!("invalid log_level {:?}", self.log_level))
    }
}
