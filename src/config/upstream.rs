//! Upstream provider configuration
//!
//! Everything the relay needs to reach the single upstream: base URL, the
//! fixed User-Agent, the credential pool, and timeouts.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default streaming timeout: wait for headers, then the longest gap between chunks
pub const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 300;

/// Default buffered round-trip timeout
pub const DEFAULT_BUFFERED_TIMEOUT_SECS: u64 = 120;

/// Upstream configuration
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Base URL requests are forwarded to (path is appended)
    pub base_url: String,
    /// User-Agent sent on every outbound request
    pub user_agent: String,
    /// Credential pool used when the caller sends no credential
    pub credentials: Vec<String>,
    /// Streaming header wait and per-chunk idle limit, in seconds
    pub stream_timeout_secs: u64,
    /// Total deadline for buffered calls, in seconds
    pub buffered_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: String::new(),
            credentials: Vec::new(),
            stream_timeout_secs: DEFAULT_STREAM_TIMEOUT_SECS,
            buffered_timeout_secs: DEFAULT_BUFFERED_TIMEOUT_SECS,
        }
    }
}

/// Upstream settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileUpstream {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub credentials: Option<Vec<String>>,
    pub stream_timeout_secs: Option<u64>,
    pub buffered_timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileUpstream>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            base_url: file.base_url.unwrap_or(defaults.base_url),
            user_agent: file.user_agent.unwrap_or(defaults.user_agent),
            credentials: file
                .credentials
                .map(clean_credentials)
                .unwrap_or(defaults.credentials),
            stream_timeout_secs: file
                .stream_timeout_secs
                .unwrap_or(defaults.stream_timeout_secs),
            buffered_timeout_secs: file
                .buffered_timeout_secs
                .unwrap_or(defaults.buffered_timeout_secs),
        }
    }

    /// Reject values the relay cannot work with
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("upstream.base_url {:?} is not a valid URL", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!(
                "upstream.base_url must use http or https, got {:?}",
                url.scheme()
            );
        }
        if self.stream_timeout_secs == 0 {
            bail!("upstream.stream_timeout_secs must be greater than zero");
        }
        if self.buffered_timeout_secs == 0 {
            bail!("upstream.buffered_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn buffered_timeout(&self) -> Duration {
        Duration::from_secs(self.buffered_timeout_secs)
    }
}

/// Trim credentials and drop blank entries
pub fn clean_credentials<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
