//! Proxy state and the hot-reloadable upstream snapshot

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::logging::LogLevelHandle;

use super::credentials::CredentialRotator;

// ─────────────────────────────────────────────────────────────────────────────
// Upstream Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Scalar settings a request reads from config, swapped as one unit
///
/// A request loads the snapshot once and uses it throughout. The rotator is
/// shared by every generation; reload resets it in place.
#[derive(Debug)]
pub struct UpstreamSnapshot {
    pub base_url: String,
    pub user_agent: String,
    pub debug: bool,
    pub stream_timeout: Duration,
    pub buffered_timeout: Duration,
    pub rotator: Arc<CredentialRotator>,
}

impl UpstreamSnapshot {
    fn from_config(config: &Config, rotator: Arc<CredentialRotator>) -> Self {
        let upstream = &config.upstream;
        Self {
            base_url: upstream.base_url.clone(),
            user_agent: upstream.user_agent.clone(),
            debug: config.debug,
            stream_timeout: upstream.stream_timeout(),
            buffered_timeout: upstream.buffered_timeout(),
            rotator,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live Config
// ─────────────────────────────────────────────────────────────────────────────

/// Current snapshot plus what is needed to rebuild it
pub struct LiveConfig {
    snapshot: ArcSwap<UpstreamSnapshot>,
    rotator: Arc<CredentialRotator>,
    /// File re-read on reload (None: env and defaults only)
    config_path: Option<PathBuf>,
    log_handle: Option<LogLevelHandle>,
    /// Bound at startup; a reload cannot move the listener
    bind_addr: SocketAddr,
    reload_lock: Mutex<()>,
}

impl LiveConfig {
    pub fn new(
        config: &Config,
        config_path: Option<PathBuf>,
        log_handle: Option<LogLevelHandle>,
    ) -> Self {
        let rotator = Arc::new(CredentialRotator::new(config.upstream.credentials.clone()));
        Self {
            snapshot: ArcSwap::from_pointee(UpstreamSnapshot::from_config(
                config,
                Arc::clone(&rotator),
            )),
            rotator,
            config_path,
            log_handle,
            bind_addr: config.bind_addr,
            reload_lock: Mutex::new(()),
        }
    }

    /// Consistent view for one request
    pub fn current(&self) -> Arc<UpstreamSnapshot> {
        self.snapshot.load_full()
    }

    /// Re-read config, reset the rotator and swap in a new snapshot
    ///
    /// All-or-nothing: nothing is touched until the new config has loaded
    /// and validated. Returns the size of the new credential pool.
    pub async fn reload(&self) -> Result<usize> {
        let _guard = self.reload_lock.lock().await;

        let config = Config::load(self.config_path.as_deref())?;

        if config.bind_addr != self.bind_addr {
            tracing::warn!(
                current = %self.bind_addr,
                configured = %config.bind_addr,
                "bind_addr changed; restart to apply"
            );
        }

        self.rotator.reset(config.upstream.credentials.clone());
        self.snapshot.store(Arc::new(UpstreamSnapshot::from_config(
            &config,
            Arc::clone(&self.rotator),
        )));
        let keys = self.rotator.len();
        if self.rotator.is_empty() {
            tracing::warn!("Credential pool is empty; callers must send their own");
        }

        if let Some(handle) = &self.log_handle {
            handle.apply(&config.logging, config.debug);
        }

        tracing::info!(
            keys,
            upstream = %config.upstream.base_url,
            debug = config.debug,
            "Configuration reloaded"
        );
        Ok(keys)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Proxy State
// ─────────────────────────────────────────────────────────────────────────────

/// Shared state for the proxy server
#[derive(Clone)]
pub struct ProxyState {
    /// HTTP client for forwarding requests
    pub(super) client: reqwest::Client,
    /// Hot-reloadable upstream settings
    pub(super) live: Arc<LiveConfig>,
}

impl ProxyState {
    pub fn new(client: reqwest::Client, live: Arc<LiveConfig>) -> Self {
        Self { client, live }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("anyrelay-state-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reload_swaps_pool_and_scalars() {
        let dir = temp_dir("swap");
        let path = write_config(
            &dir,
            "[upstream]\nbase_url = \"http://one.test\"\ncredentials = [\"a\", \"b\"]\n",
        );
        let config = Config::load(Some(path.as_path())).unwrap();
        let live = LiveConfig::new(&config, Some(path.clone()), None);

        let before = live.current();
        assert_eq!(before.rotator.next().as_deref(), Some("a"));

        write_config(
            &dir,
            "debug = true\n[upstream]\nbase_url = \"http://two.test\"\ncredentials = [\"x\", \"y\", \"z\"]\n",
        );
        assert_eq!(live.reload().await.unwrap(), 3);

        let after = live.current();
        assert_eq!(after.base_url, "http://two.test");
        assert!(after.debug);
        // cursor restarts at the head of the new pool
        assert_eq!(after.rotator.next().as_deref(), Some("x"));
        // a request holding the old snapshot keeps its scalars; rotation is shared
        assert_eq!(before.base_url, "http://one.test");
        assert_eq!(before.rotator.next().as_deref(), Some("y"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let dir = temp_dir("fail");
        let path = write_config(&dir, "[upstream]\ncredentials = [\"a\"]\n");
        let config = Config::load(Some(path.as_path())).unwrap();
        let live = LiveConfig::new(&config, Some(path.clone()), None);

        write_config(&dir, "[upstream\nbroken");
        let err = live.reload().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));

        let current = live.current();
        assert_eq!(current.rotator.len(), 1);
        assert_eq!(current.rotator.next().as_deref(), Some("a"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
