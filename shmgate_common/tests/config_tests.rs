//! Config loading tests.
//!
//! Tests for `ConfigLoader::load()`: missing file, syntax errors, defaults
//! for omitted fields, unknown log levels, and embedding `SharedConfig` in a
//! binary-specific struct.

use serde::Deserialize;
use shmgate_common::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
use shmgate_common::consts::DEFAULT_SERVICE_NAME;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize)]
struct GatewayConfig {
    #[serde(default)]
    shared: SharedConfig,
    port: u16,
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = GatewayConfig::load(&path).unwrap_err();
    match err {
        ConfigError::FileNotFound(reported) => assert!(reported.ends_with("absent.toml")),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn test_load_embedded_shared_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shmgate.toml");
    fs::write(
        &path,
        r#"
port = 50000

[shared]
log_level = "warn"
service_name = "shmgate-edge-01"
"#,
    )
    .unwrap();

    let config = GatewayConfig::load(&path).unwrap();
    assert_eq!(config.port, 50000);
    assert_eq!(config.shared.log_level, LogLevel::Warn);
    assert_eq!(config.shared.service_name, "shmgate-edge-01");
    assert!(config.shared.validate().is_ok());
}

#[test]
fn test_omitted_shared_section_uses_defaults() {
    let config = GatewayConfig::parse("port = 8080").unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Info);
    assert_eq!(config.shared.service_name, DEFAULT_SERVICE_NAME);
}

#[test]
fn test_syntax_error_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "port = ").unwrap();

    assert!(matches!(
        GatewayConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_unknown_log_level_rejected() {
    let result = GatewayConfig::parse(
        r#"
port = 1
[shared]
log_level = "loud"
"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}
