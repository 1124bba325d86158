// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the pulse service.

pub mod http;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::PulseState;

/// Embedded landing page.
const INDEX_HTML: &str = include_str!("../web/index.html");

/// Build the axum `Router` with all pulse routes.
pub fn build_router(state: Arc<PulseState>) -> Router {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/api/health", get(http::health))
        .route("/api/sessions", get(http::list_sessions))
        .route("/api/submit", post(http::submit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
