//! Configuration for the relay server
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/anyrelay/config.toml, or `ANYRELAY_CONFIG`)
//! 3. Built-in defaults (lowest priority)
//!
//! Unlike a one-shot startup loader, `Config::load` never exits the process:
//! the same call backs the `/reload` endpoint, where a broken file must leave
//! the running configuration untouched.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod logging;
mod serialization;
mod upstream;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use logging::{FileLogging, LogRotation, LoggingConfig};
pub use upstream::{clean_credentials, FileUpstream, UpstreamConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Env var that points at an alternate config file
pub const CONFIG_PATH_ENV: &str = "ANYRELAY_CONFIG";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the relay server to
    pub bind_addr: SocketAddr,

    /// Verbose request logging (forces the `debug` log level)
    pub debug: bool,

    /// Upstream provider settings
    pub upstream: UpstreamConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080))),
            debug: false,
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub bind_addr: Option<String>,
    pub debug: Option<bool>,

    /// Optional [upstream] section
    pub upstream: Option<FileUpstream>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the default config file path: ~/.config/anyrelay/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("anyrelay").join("config.toml"))
    }

    /// Resolve the config file to use: CLI flag > `ANYRELAY_CONFIG` > default
    pub fn resolve_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit
            .or_else(|| env_var(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::config_path)
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists(path: &Path) {
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Write config (ignore errors - config is optional)
        let _ = std::fs::write(path, Self::default().to_toml());
    }

    /// Read and parse the config file, if there is one
    fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
        let Some(path) = path else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read config file {}", path.display())),
        }
    }

    /// Load configuration: env vars > file > defaults
    ///
    /// Errors leave no partial state behind; the caller decides whether a
    /// failure is fatal (startup) or reported (reload).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = Self::load_file_config(path)?;
        Self::from_sources(file, env_var)
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Bind address: ANYRELAY_BIND > PORT > file > default
        let bind_addr = env("ANYRELAY_BIND")
            .or_else(|| env("PORT").map(|port| format!("0.0.0.0:{}", port.trim())))
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address {:?}", bind_addr))?;

        // Debug: env > file > default
        let debug = env("ANYRELAY_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .or(file.debug)
            .unwrap_or(false);

        let mut upstream = UpstreamConfig::from_file(file.upstream);
        if let Some(url) = env("ANYRELAY_UPSTREAM_URL") {
            upstream.base_url = url;
        }
        if let Some(ua) = env("ANYRELAY_USER_AGENT") {
            upstream.user_agent = ua;
        }
        if let Some(list) = env("ANYRELAY_CREDENTIALS") {
            upstream.credentials = clean_credentials(list.split(',').map(String::from));
        }
        upstream.validate()?;

        let logging = LoggingConfig::from_file(file.logging);

        Ok(Self {
            bind_addr,
            debug,
            upstream,
            logging,
        })
    }
}

/// Read a non-empty environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
