// anyrelay - rewriting reverse proxy for a single chat-completion upstream
//
// Sits between a chat client and one upstream provider. Each inbound chat
// request is rewritten into the shape the upstream accepts (fixed system
// preamble, caller instructions folded into the first user turn, merged
// turns, cache annotations) and forwarded with either the caller's credential
// or the next one from a rotating pool.
//
// Architecture:
// - Config: TOML file + env overrides, hot-reloadable via POST /reload
// - Proxy server (axum): catch-all route feeding the transformation pipeline
// - Relay (reqwest): one upstream attempt, streamed or buffered
// - Logging (tracing): stdout + optional rolling JSON files

mod cli;
mod config;
mod logging;
mod proxy;
mod startup;

use anyhow::Result;
use clap::Parser;
use config::Config;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Handle CLI commands first (config --show, --path, --reset)
    if cli::handle_cli(&cli) {
        return Ok(());
    }

    let config_path = Config::resolve_path(cli.config.clone());

    // Ensure config template exists (helps users discover options)
    if let Some(path) = &config_path {
        Config::ensure_config_exists(path);
    }

    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!();
            eprintln!("  Configuration error: {:#}", e);
            eprintln!();
            std::process::exit(1);
        }
    };

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let (log_handle, _file_guard) = logging::init(&config);

    let live = Arc::new(proxy::LiveConfig::new(
        &config,
        config_path.clone(),
        Some(log_handle),
    ));

    // Create shutdown channel for graceful proxy shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut proxy_handle = tokio::spawn(proxy::start_proxy(
        config.bind_addr,
        Arc::clone(&live),
        shutdown_rx,
    ));

    startup::print_startup(&config, config_path.as_deref());
    startup::log_startup(&config);

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutting down...");
        }
        // Server stopped on its own (bind failure, fatal I/O error)
        finished = &mut proxy_handle => {
            return match finished {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("Proxy task panicked: {}", e)),
            };
        }
    }

    // Signal the proxy to shut down gracefully
    // If the send fails, the proxy has already shut down (which is fine)
    let _ = shutdown_tx.send(());
    match proxy_handle.await {
        Ok(result) => result?,
        Err(e) => tracing::error!("Proxy task panicked: {}", e),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
