// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use astropass_session::ClientConfig;

use crate::command::Command;

/// Terminal client for the Astropass identity service.
#[derive(Debug, Parser)]
#[command(name = "astropass", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientConfig,

    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[arg(long, env = "ASTROPASS_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (json or text).
    #[arg(long, env = "ASTROPASS_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: String,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
        if !self.client.api_url.starts_with("http://") && !self.client.api_url.starts_with("https://")
        {
            anyhow::bail!("--api-url must be an http(s) url");
        }
        if self.client.request_timeout_ms == 0 || self.client.refresh_timeout_ms == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }
        if self.client.logout_poll_ms == 0 {
            anyhow::bail!("--logout-poll-ms must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
