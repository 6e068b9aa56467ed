// CLI module - command-line argument parsing and handlers
//
// Provides subcommands for configuration management:
// - config --show: Display effective configuration (credentials redacted)
// - config --path: Print the config file location
// - config --reset: Regenerate config file with defaults

use crate::config::{Config, VERSION};
use crate::proxy::credentials::fingerprint;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// anyrelay - rewriting reverse proxy for a single chat-completion upstream
#[derive(Parser)]
#[command(name = "anyrelay")]
#[command(version = VERSION)]
#[command(about = "Rewriting reverse proxy with credential rotation", long_about = None)]
pub struct Cli {
    /// Config file to use (overrides ANYRELAY_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli(cli: &Cli) -> bool {
    let Some(Commands::Config { show, reset, path }) = &cli.command else {
        return false; // No subcommand, run normal proxy
    };

    let Some(config_path) = Config::resolve_path(cli.config.clone()) else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if *path {
        println!("{}", config_path.display());
    } else if *show {
        handle_config_show(&config_path);
    } else if *reset {
        handle_config_reset(&config_path);
    } else {
        // No flag provided, show help
        println!("Usage: anyrelay config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
    }
    true
}

/// Replace each credential with a short fingerprint
fn redact(mut config: Config) -> Config {
    config.upstream.credentials = config
        .upstream
        .credentials
        .iter()
        .map(|c| format!("<redacted {}>", fingerprint(c)))
        .collect();
    config
}

fn handle_config_show(path: &Path) {
    let config = match Config::load(Some(path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    println!("# Effective configuration (env > file > defaults)");
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }
    println!();
    print!("{}", redact(config).to_toml());
}

fn handle_config_reset(path: &Path) {
    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().ok();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}
