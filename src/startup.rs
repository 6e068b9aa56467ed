// Startup module - displays banner and effective settings
//
// The banner goes to stdout before the server starts; `log_startup` repeats
// the essentials through tracing so they also land in file logs.

use crate::config::{Config, VERSION};
use std::path::Path;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Print the startup banner
pub fn print_startup(config: &Config, config_path: Option<&Path>) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}anyrelay{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Rewriting reverse proxy with credential rotation{RESET}");
    println!();

    match config_path {
        Some(path) if path.exists() => {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display())
        }
        _ => println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}"),
    }
    println!("  {DIM}Upstream:{RESET} {}", config.upstream.base_url);

    let keys = config.upstream.credentials.len();
    if keys == 0 {
        println!(
            "  {DIM}Keys:{RESET} {YELLOW}none{RESET} {DIM}(callers must send their own){RESET}"
        );
    } else {
        println!("  {DIM}Keys:{RESET} {GREEN}{keys}{RESET} {DIM}in rotation{RESET}");
    }
    if config.debug {
        println!("  {YELLOW}▸{RESET} {YELLOW}Debug logging active{RESET}");
    }
    println!();

    println!(
        "  {MAGENTA}▸{RESET} Proxy listening on {BOLD}{}{RESET}",
        config.bind_addr
    );
    println!("  {DIM}POST /reload to re-read configuration{RESET}");
    println!();
}

/// Log startup summary through tracing
pub fn log_startup(config: &Config) {
    tracing::info!(
        keys = config.upstream.credentials.len(),
        upstream = %config.upstream.base_url,
        debug = config.debug,
        "anyrelay v{} starting",
        VERSION
    );
    tracing::info!("Listening on {}", config.bind_addr);
}
