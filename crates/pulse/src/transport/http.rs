// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the pulse API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::credential;
use crate::error::{FieldError, StatusOk, SubmitError};
use crate::state::{JobEntry, PulseState};
use crate::upstream::client::UpstreamClient;
use crate::upstream::repeater::spawn_repeater;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub job_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub cookie: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// 1-based position in the listing snapshot.
    pub session: usize,
    pub url: String,
    pub count: u64,
    pub id: u64,
    pub target: u64,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/health`
pub async fn health(State(s): State<Arc<PulseState>>) -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned(), job_count: s.registry.len().await })
}

/// `GET /api/sessions` — snapshot of all in-flight jobs.
pub async fn list_sessions(State(s): State<Arc<PulseState>>) -> impl IntoResponse {
    let jobs = s.registry.list_all().await;
    let list: Vec<SessionInfo> = jobs
        .iter()
        .enumerate()
        .map(|(i, e)| SessionInfo {
            session: i + 1,
            url: e.url.clone(),
            count: e.completed.load(Ordering::Relaxed),
            id: e.id,
            target: e.target,
        })
        .collect();
    Json(list)
}

/// `POST /api/submit` — create a job and start its repeater.
///
/// Fire-and-forget: the 200 goes out as soon as the job is registered; the
/// repeater keeps updating the registry in the background.
pub async fn submit(
    State(s): State<Arc<PulseState>>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    // An empty string counts as missing, same as an absent field.
    let cookie = req.cookie.filter(|c| !c.is_empty());
    let url = req.url.filter(|u| !u.is_empty());
    let (Some(cookie), Some(url)) = (cookie, url) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(FieldError { error: "Missing cookie or url".to_owned() }),
        )
            .into_response();
    };

    let cookie_header = match credential::normalize(&cookie) {
        Ok(header) => header,
        Err(e) => {
            tracing::warn!(err = %e, "credential normalization failed");
            return SubmitError::from(e).to_http_response().into_response();
        }
    };

    let client = UpstreamClient::new(&s.config);

    let Some(id) = client.resolve_id(&url).await else {
        return SubmitError::UnresolvableResource.to_http_response().into_response();
    };

    let Some(access_token) = client.fetch_access_token(&cookie_header).await else {
        return SubmitError::InvalidCredential.to_http_response().into_response();
    };

    let key = s.registry.next_key(id);
    // Clone for the log line before the entry takes ownership.
    let log_url = url.clone();
    let entry = Arc::new(JobEntry {
        id,
        url,
        target: s.config.target,
        completed: AtomicU64::new(0),
        interval: s.config.tick_interval(),
        cookie_header,
        access_token,
        created_at: Instant::now(),
        cancel: CancellationToken::new(),
    });
    s.registry.put(key, Arc::clone(&entry)).await;
    spawn_repeater(Arc::clone(&s), key, entry);

    tracing::info!(job = %key, url = %log_url, "job created");
    Json(StatusOk { status: 200 }).into_response()
}
