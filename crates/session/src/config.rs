// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

/// File name of the persisted session record inside the state directory.
pub const SESSION_FILE: &str = "astro-pass-auth.json";

/// Configuration for the session client.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Backend base URL. Endpoint paths are appended to it.
    #[arg(long, default_value = "http://127.0.0.1:8080/api", env = "ASTROPASS_API_URL")]
    pub api_url: String,

    /// Directory holding the persisted session record.
    #[arg(long, env = "ASTROPASS_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Keep the session in memory only.
    #[arg(long, env = "ASTROPASS_EPHEMERAL")]
    pub ephemeral: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "ASTROPASS_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// Upper bound on a token refresh call in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "ASTROPASS_REFRESH_TIMEOUT_MS")]
    pub refresh_timeout_ms: u64,

    /// Refresh this many seconds before the access token expires. 0 disables.
    #[arg(long, default_value_t = 30, env = "ASTROPASS_REFRESH_MARGIN_SECS")]
    pub refresh_margin_secs: u64,

    /// SSO logout status poll interval in milliseconds.
    #[arg(long, default_value_t = 1000, env = "ASTROPASS_LOGOUT_POLL_MS")]
    pub logout_poll_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/api".to_owned(),
            state_dir: None,
            ephemeral: false,
            request_timeout_ms: 10_000,
            refresh_timeout_ms: 10_000,
            refresh_margin_secs: 30,
            logout_poll_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `api_url` that never touches disk.
    pub fn ephemeral(api_url: impl Into<String>) -> Self {
        Self { api_url: api_url.into(), ephemeral: true, ..Self::default() }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }

    pub fn logout_poll_interval(&self) -> Duration {
        Duration::from_millis(self.logout_poll_ms.max(1))
    }

    /// Resolved state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Location of the persisted session record, or `None` when ephemeral.
    pub fn session_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            None
        } else {
            Some(self.state_dir().join(SESSION_FILE))
        }
    }
}

/// Resolve the default state directory.
///
/// Checks `$XDG_STATE_HOME/astropass`, then `$HOME/.local/state/astropass`.
pub fn default_state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("astropass");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/astropass");
    }
    PathBuf::from(".astropass")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
