//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize the credential pool as a TOML array
    fn credentials_to_toml(&self) -> String {
        if self.upstream.credentials.is_empty() {
            return r#"credentials = []
# credentials = ["sk-first", "sk-second"]   # Rotated round-robin when the caller sends none"#
                .to_string();
        }

        let mut output = String::from("credentials = [\n");
        for credential in &self.upstream.credentials {
            output.push_str(&format!("  {:?},\n", credential));
        }
        output.push(']');
        output
    }

    /// Render the full config file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# anyrelay configuration
#
# Precedence: environment variables > this file > built-in defaults.
# Reload without restarting: POST /reload

# Address to listen on (ANYRELAY_BIND, or PORT for 0.0.0.0:$PORT)
bind_addr = {bind_addr:?}

# Verbose request logging; forces the debug log level (ANYRELAY_DEBUG)
debug = {debug}

[upstream]
# Requests to /<path> are forwarded to <base_url>/<path> (ANYRELAY_UPSTREAM_URL)
base_url = {base_url:?}
# Fixed User-Agent for every outbound request (ANYRELAY_USER_AGENT)
user_agent = {user_agent:?}
# Credential pool (ANYRELAY_CREDENTIALS, comma separated)
{credentials}
# Timeouts in seconds
stream_timeout_secs = {stream_timeout}
buffered_timeout_secs = {buffered_timeout}

[logging]
# trace, debug, info, warn, error (RUST_LOG takes precedence)
level = {level:?}
file_enabled = {file_enabled}
file_dir = {file_dir:?}
# hourly, daily, never
file_rotation = {rotation:?}
file_prefix = {file_prefix:?}
"#,
            bind_addr = self.bind_addr.to_string(),
            debug = self.debug,
            base_url = self.upstream.base_url,
            user_agent = self.upstream.user_agent,
            credentials = self.credentials_to_toml(),
            stream_timeout = self.upstream.stream_timeout_secs,
            buffered_timeout = self.upstream.buffered_timeout_secs,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string(),
            rotation = self.logging.file_rotation.as_str(),
            file_prefix = self.logging.file_prefix,
        )
    }
}
