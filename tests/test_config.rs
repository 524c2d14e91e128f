use std::path::PathBuf;
use std::time::Duration;

use halo::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.files_root, PathBuf::from("files"));
    assert_eq!(cfg.idle_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.max_header_bytes, 64 * 1024);
    assert_eq!(cfg.max_body_bytes, 16 * 1024 * 1024);
    assert_eq!(cfg.stream_interval(), Duration::from_secs(1));
    assert!(cfg.is_echo_route("/echo"));
    assert!(cfg.is_echo_route("/halo"));
    assert!(!cfg.is_echo_route("/"));
    assert_eq!(cfg.tracing_level().unwrap(), tracing::Level::INFO);
}

#[test]
fn test_config_from_empty_yaml() {
    let cfg = Config::from_yaml("").unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
}

#[test]
fn test_config_from_partial_yaml() {
    let cfg = Config::from_yaml(
        "listen_addr: \"0.0.0.0:3000\"\nidle_timeout_ms: 250\necho_routes: [\"/mirror\"]\nlog_level: debug\n",
    )
    .unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.idle_timeout(), Duration::from_millis(250));
    assert!(cfg.is_echo_route("/mirror"));
    assert!(!cfg.is_echo_route("/echo"));
    assert_eq!(cfg.tracing_level().unwrap(), tracing::Level::DEBUG);
    // Untouched fields keep their defaults
    assert_eq!(cfg.files_root, PathBuf::from("files"));
}

#[test]
fn test_config_rejects_bad_yaml() {
    assert!(Config::from_yaml("idle_timeout_ms: soon").is_err());
}

#[test]
fn test_config_rejects_unknown_log_level() {
    let cfg = Config {
        log_level: "loud".to_string(),
        ..Config::default()
    };
    let err = cfg.tracing_level().unwrap_err();
    assert!(err.to_string().contains("loud"));

    assert!(Config::from_yaml("log_level: loud\n").is_err());
    assert!(Config::from_yaml("log_level: WARN\n").is_ok());
}

// Environment is process-wide, so every env-dependent case lives in one test.
#[test]
fn test_config_load_from_env() {
    let path = std::env::temp_dir().join(format!("halo-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "files_root: /srv/uploads\nstream_interval_ms: 5\n").unwrap();

    unsafe {
        std::env::set_var("HALO_CONFIG", &path);
        std::env::set_var("LISTEN", "127.0.0.1:9000");
        std::env::remove_var("FILES_ROOT");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.files_root, PathBuf::from("/srv/uploads"));
    assert_eq!(cfg.stream_interval(), Duration::from_millis(5));

    unsafe {
        std::env::set_var("FILES_ROOT", "/tmp/override");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.files_root, PathBuf::from("/tmp/override"));

    unsafe {
        std::env::set_var("HALO_CONFIG", path.with_extension("missing"));
    }
    assert!(Config::load().is_err());

    unsafe {
        std::env::remove_var("HALO_CONFIG");
        std::env::remove_var("LISTEN");
        std::env::remove_var("FILES_ROOT");
    }
    let _ = std::fs::remove_file(path);
}
