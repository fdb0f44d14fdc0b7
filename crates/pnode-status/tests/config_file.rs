//! Loading configuration files from disk.

use pnode_status::{AppConfig, ConfigError};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_yaml_file_is_layered_over_defaults() {
    let file = write_config(
        "resolver:\n  secondary_rpc_url: http://127.0.0.1:8899\n  secondary_timeout: 3s\n  rng_seed: 9\nserver:\n  bind_addr: 127.0.0.1:9090\n",
        ".yaml",
    );

    let config = AppConfig::from_file(file.path()).unwrap();

    assert_eq!(config.resolver.secondary_rpc_url, "http://127.0.0.1:8899");
    assert_eq!(config.resolver.secondary_timeout, Duration::from_secs(3));
    assert_eq!(config.resolver.primary_timeout, Duration::from_secs(10));
    assert_eq!(config.resolver.rng_seed, Some(9));
    assert_eq!(config.server.bind_addr.port(), 9090);
    assert_eq!(config.server.revalidate, Duration::from_secs(30));
}

#[test]
fn test_json_file() {
    let file = write_config(
        r#"{"resolver": {"simulation_count": 5}, "server": {"revalidate": "10s"}}"#,
        ".json",
    );

    let config = AppConfig::from_file(file.path()).unwrap();

    assert_eq!(config.resolver.simulation_count, 5);
    assert_eq!(config.server.revalidate, Duration::from_secs(10));
}

#[test]
fn test_load_rejects_invalid_settings() {
    let file = write_config("resolver:\n  primary_timeout: 0s\n", ".yaml");
    assert!(AppConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    match AppConfig::from_file(&path) {
        Err(ConfigError::Io { path: reported, .. }) => {
            assert!(reported.ends_with("absent.yaml"));
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}
