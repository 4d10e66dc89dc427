//! Command-line and environment configuration.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::state::session::SessionOptions;
use crate::util::dark_mode::DEFAULT_PREFS_FILE;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TYPING_TIMEOUT_MS: u64 = 2000;

/// Engine.IO v4 websocket endpoint, relative to the server root.
const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid server URL `{0}`: expected an http, https, ws, or wss URL with a host")]
    InvalidServerUrl(String),
    #[error("typing timeout must be greater than zero")]
    ZeroTypingTimeout,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "roomchat", about = "Terminal client for room-based realtime chat")]
pub struct Cli {
    #[arg(long, env = "ROOMCHAT_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Room to join; prompted for when absent.
    #[arg(long, env = "ROOMCHAT_ROOM")]
    pub room: Option<String>,

    /// Name shown to other members; prompted for when absent.
    #[arg(long, env = "ROOMCHAT_USERNAME")]
    pub username: Option<String>,

    /// Quiet period before "stop typing" is sent.
    #[arg(long, env = "ROOMCHAT_TYPING_TIMEOUT_MS", default_value_t = DEFAULT_TYPING_TIMEOUT_MS)]
    pub typing_timeout_ms: u64,

    /// Where the dark mode preference is stored.
    #[arg(long, env = "ROOMCHAT_PREFS_FILE")]
    pub prefs_file: Option<PathBuf>,

    /// Show the server's echo of our own messages as well as the local copy.
    #[arg(long, default_value_t = false)]
    pub keep_echo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub socket_url: String,
    pub room: Option<String>,
    pub username: Option<String>,
    pub session: SessionOptions,
    pub prefs_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Validate parsed arguments into a typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unusable server URL or a zero timeout.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.typing_timeout_ms == 0 {
            return Err(ConfigError::ZeroTypingTimeout);
        }
        let prefs_file = cli.prefs_file.or_else(|| default_prefs_file(std::env::var_os("HOME")));

        Ok(Self {
            socket_url: socket_url(&cli.server_url)?,
            room: non_blank(cli.room),
            username: non_blank(cli.username),
            session: SessionOptions {
                typing_timeout: Duration::from_millis(cli.typing_timeout_ms),
                suppress_echo: !cli.keep_echo,
            },
            prefs_file,
        })
    }
}

/// Derive the Socket.IO websocket URL from a server base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidServerUrl`] for unknown schemes or a
/// missing host.
pub fn socket_url(base: &str) -> Result<String, ConfigError> {
    let trimmed = base.trim().trim_end_matches('/');
    let invalid = || ConfigError::InvalidServerUrl(base.to_owned());

    let (scheme, rest) = trimmed.split_once("://").ok_or_else(invalid)?;
    let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid()),
    };
    if rest.is_empty() || rest.starts_with('/') {
        return Err(invalid());
    }
    Ok(format!("{ws_scheme}://{rest}{SOCKET_PATH}"))
}

fn default_prefs_file(home: Option<OsString>) -> Option<PathBuf> {
    home.filter(|h| !h.is_empty()).map(|h| PathBuf::from(h).join(DEFAULT_PREFS_FILE))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
