// Logging module - tracing subscriber setup with a reloadable level filter
//
// Stdout always gets the human-readable fmt layer. When file logging is
// enabled, a second JSON layer writes to rolling files through a non-blocking
// writer. The level filter sits behind a reload handle so that flipping
// `debug` in the config file takes effect on the next `/reload`.
//
// Precedence: RUST_LOG env var > config `debug` > config `logging.level`

use crate::config::{Config, LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Build the filter directive for our own crate
fn directive(level: &str) -> String {
    format!("warn,anyrelay={}", level)
}

/// Handle for changing the log level after startup
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: reload::Handle<EnvFilter, Registry>,
    /// RUST_LOG was set at startup; config changes must not override it
    pinned: bool,
}

impl LogLevelHandle {
    /// Re-apply the level implied by a (re)loaded config
    pub fn apply(&self, logging: &LoggingConfig, debug: bool) {
        if self.pinned {
            return;
        }
        let level = logging.effective_level(debug);
        match EnvFilter::try_new(directive(level)) {
            Ok(filter) => {
                if let Err(e) = self.inner.reload(filter) {
                    tracing::warn!("Failed to reload log filter: {}", e);
                }
            }
            Err(e) => tracing::warn!(level, "Invalid log level in config: {}", e),
        }
    }
}

/// Initialize tracing for the process
///
/// The returned guard must be kept alive for the duration of the program so
/// buffered file logs are flushed on exit.
pub fn init(config: &Config) -> (LogLevelHandle, Option<WorkerGuard>) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let pinned = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| {
        let level = config.logging.effective_level(config.debug);
        EnvFilter::try_new(directive(level)).unwrap_or_else(|_| EnvFilter::new(directive("info")))
    });
    let (filter_layer, handle) = reload::Layer::new(filter);

    // Set up file logging if enabled (non-blocking writer with rotation)
    let (file_layer, guard) = if config.logging.file_enabled {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Ok(()) => {
                let (non_blocking, guard) =
                    tracing_appender::non_blocking(file_appender(&config.logging));
                // File layer uses JSON format for structured log parsing
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    (
        LogLevelHandle {
            inner: handle,
            pinned,
        },
        guard,
    )
}

/// Create rolling file appender based on configured rotation
fn file_appender(logging: &LoggingConfig) -> tracing_appender::rolling::RollingFileAppender {
    match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_scopes_crate_level() {
        assert_eq!(directive("debug"), "warn,anyrelay=debug");
        assert!(EnvFilter::try_new(directive("trace")).is_ok());
    }
}
