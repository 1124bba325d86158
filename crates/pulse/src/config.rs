// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the pulse service.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "pulse", about = "Cadence-driven repeater for third-party write actions")]
pub struct PulseConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "PULSE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5000, env = "PORT")]
    pub port: u16,

    /// Resolver endpoint that maps a resource URL to its numeric id.
    #[arg(long, env = "PULSE_RESOLVER_URL")]
    pub resolver_url: String,

    /// Session page fetched with the normalized credential to scrape an access token.
    #[arg(long, env = "PULSE_SESSION_PAGE_URL")]
    pub session_page_url: String,

    /// Write-action endpoint invoked once per tick.
    #[arg(long, env = "PULSE_WRITE_URL")]
    pub write_url: String,

    /// Base URL the resolved id is appended to when building the link
    /// query parameter of each write call.
    #[arg(long, env = "PULSE_LINK_BASE_URL")]
    pub link_base_url: String,

    /// Repetitions to perform per job.
    #[arg(long, default_value_t = 1000, env = "PULSE_TARGET")]
    pub target: u64,

    /// Tick interval in milliseconds.
    #[arg(long, default_value_t = 1000, env = "PULSE_TICK_INTERVAL_MS")]
    pub tick_interval_ms: u64,

    /// Outbound request timeout in milliseconds.
    #[arg(long, default_value_t = 10000, env = "PULSE_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,
}

impl PulseConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}
