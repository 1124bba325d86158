// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pulse: cadence-driven repeater for third-party write actions.
//!
//! Accepts a session credential and a resource reference, resolves the
//! reference to a numeric id, exchanges the credential for an access token,
//! then drives a fixed-cadence write loop until a target count or deadline.

pub mod config;
pub mod credential;
pub mod error;
pub mod state;
pub mod transport;
pub mod upstream;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::PulseConfig;
use crate::state::PulseState;
use crate::transport::build_router;

/// Run the pulse server until shutdown.
pub async fn run(config: PulseConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let state = Arc::new(PulseState::new(config, shutdown.clone()));

    // Ctrl-c drains into a graceful shutdown.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    tracing::info!("pulse listening on {addr}");
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
