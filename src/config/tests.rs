//! Configuration tests
//!
//! Environment lookups are injected through `Config::from_sources`, so these
//! tests never touch the process environment.

use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).expect("fixture should parse")
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// The generated template must be valid TOML that loads back to the defaults.
#[test]
fn test_config_roundtrip_default() {
    let toml_str = Config::default().to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );

    let config = Config::from_sources(parsed.unwrap(), no_env).unwrap();
    assert_eq!(config.upstream, UpstreamConfig::default());
    assert_eq!(config.bind_addr.port(), 8080);
    assert!(!config.debug);
}

#[test]
fn test_config_roundtrip_with_credentials() {
    let mut config = Config::default();
    config.upstream.credentials = vec!["sk-a".to_string(), "sk-\"quoted\"".to_string()];
    config.upstream.user_agent = "claude-cli/1.0.0 (external, cli)".to_string();
    config.debug = true;

    let toml_str = config.to_toml();
    let loaded = Config::from_sources(parse(&toml_str), no_env).unwrap();

    assert_eq!(loaded.upstream.credentials, config.upstream.credentials);
    assert_eq!(loaded.upstream.user_agent, config.upstream.user_agent);
    assert!(loaded.debug);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_file_values_override_defaults() {
    let file = parse(
        r#"
bind_addr = "127.0.0.1:9000"
debug = true

[upstream]
base_url = "https://relay.example.com/"
user_agent = "ua/1"
credentials = ["k1", "  k2  ", ""]
stream_timeout_secs = 600

[logging]
level = "warn"
file_rotation = "hourly"
"#,
    );

    let config = Config::from_sources(file, no_env).unwrap();
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
    assert!(config.debug);
    assert_eq!(config.upstream.base_url, "https://relay.example.com/");
    assert_eq!(config.upstream.user_agent, "ua/1");
    assert_eq!(config.upstream.credentials, vec!["k1", "k2"]);
    assert_eq!(config.upstream.stream_timeout_secs, 600);
    assert_eq!(
        config.upstream.buffered_timeout_secs,
        upstream::DEFAULT_BUFFERED_TIMEOUT_SECS
    );
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
bind_addr = "127.0.0.1:9000"
[upstream]
base_url = "https://file.example.com"
credentials = ["from-file"]
"#,
    );
    let env = env_from(&[
        ("PORT", "7000"),
        ("ANYRELAY_UPSTREAM_URL", "http://env.example.com"),
        ("ANYRELAY_CREDENTIALS", "a, b,,c"),
        ("ANYRELAY_DEBUG", "TRUE"),
    ]);

    let config = Config::from_sources(file, env).unwrap();
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:7000");
    assert_eq!(config.upstream.base_url, "http://env.example.com");
    assert_eq!(config.upstream.credentials, vec!["a", "b", "c"]);
    assert!(config.debug);
}

#[test]
fn test_explicit_bind_beats_port() {
    let env = env_from(&[("ANYRELAY_BIND", "127.0.0.1:1234"), ("PORT", "7000")]);
    let config = Config::from_sources(FileConfig::default(), env).unwrap();
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:1234");
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_base_url_rejected() {
    let file = parse(
        r#"
[upstream]
base_url = "not a url"
"#,
    );
    let err = Config::from_sources(file, no_env).unwrap_err();
    assert!(err.to_string().contains("base_url"), "got: {err}");
}

#[test]
fn test_non_http_scheme_rejected() {
    let env = env_from(&[("ANYRELAY_UPSTREAM_URL", "ftp://example.com")]);
    assert!(Config::from_sources(FileConfig::default(), env).is_err());
}

#[test]
fn test_zero_timeout_rejected() {
    let file = parse(
        r#"
[upstream]
buffered_timeout_secs = 0
"#,
    );
    assert!(Config::from_sources(file, no_env).is_err());
}

#[test]
fn test_invalid_bind_rejected() {
    let env = env_from(&[("PORT", "eighty")]);
    assert!(Config::from_sources(FileConfig::default(), env).is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// File loading
// ─────────────────────────────────────────────────────────────────────────────

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("anyrelay-test-{}-{}", std::process::id(), name))
}

#[test]
fn test_missing_file_uses_defaults() {
    let path = temp_path("missing.toml");
    let file = Config::load_file_config(Some(path.as_path())).unwrap();
    assert!(file.upstream.is_none());
}

#[test]
fn test_malformed_file_is_an_error() {
    let path = temp_path("malformed.toml");
    std::fs::write(&path, "bind_addr = [unterminated").unwrap();

    let result = Config::load_file_config(Some(path.as_path()));
    let _ = std::fs::remove_file(&path);

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config file"));
}

#[test]
fn test_ensure_config_exists_writes_template_once() {
    let dir = temp_path("ensure");
    let path = dir.join("config.toml");
    let _ = std::fs::remove_dir_all(&dir);

    Config::ensure_config_exists(&path);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[upstream]"));

    std::fs::write(&path, "debug = true\n").unwrap();
    Config::ensure_config_exists(&path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "debug = true\n");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_effective_level_honors_debug() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.effective_level(false), "info");
    assert_eq!(logging.effective_level(true), "debug");
}
