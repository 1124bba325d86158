// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle tests: every terminal transition evicts the job.
//!
//! Drives the real submit path against a loopback stub upstream whose write
//! endpoint can succeed, fail, or stall.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_test::TestServer;
use tokio_util::sync::CancellationToken;

use pulse::config::PulseConfig;
use pulse::state::PulseState;
use pulse::transport::build_router;

const TIMEOUT: Duration = Duration::from_secs(5);
const VALID_COOKIE: &str = r#"[{"key":"sb","value":"X"}]"#;

/// Stub upstream whose write endpoint answers `write_status` after
/// `write_delay`, counting every call it receives.
async fn spawn_stub(
    write_status: StatusCode,
    write_delay: Duration,
    writes: Arc<AtomicU64>,
) -> anyhow::Result<String> {
    let write = move || {
        let writes = Arc::clone(&writes);
        async move {
            writes.fetch_add(1, Ordering::Relaxed);
            if !write_delay.is_zero() {
                tokio::time::sleep(write_delay).await;
            }
            write_status
        }
    };
    let app = Router::new()
        .route("/resolve", post(|| async { Json(serde_json::json!({"id": 7})) }))
        .route("/session", get(|| async { r#"{"accessToken":"tok-lifecycle"}"# }))
        .route("/write", post(write));

    install_crypto_provider();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Install the rustls crypto provider once per test process.
///
/// Production does this in `main`; the tests build a reqwest `Client` through
/// the library and need the same process-global provider in place.
fn install_crypto_provider() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

fn test_state(upstream_base: &str, target: u64, tick_ms: u64) -> Arc<PulseState> {
    let config = PulseConfig {
        host: "127.0.0.1".into(),
        port: 0,
        resolver_url: format!("{upstream_base}/resolve"),
        session_page_url: format!("{upstream_base}/session"),
        write_url: format!("{upstream_base}/write"),
        link_base_url: format!("{upstream_base}/r"),
        target,
        tick_interval_ms: tick_ms,
        request_timeout_ms: 2000,
    };
    Arc::new(PulseState::new(config, CancellationToken::new()))
}

async fn submit(server: &TestServer) -> anyhow::Result<()> {
    let resp = server
        .post("/api/submit")
        .json(&serde_json::json!({"cookie": VALID_COOKIE, "url": "http://example.com/post/7"}))
        .await;
    if resp.status_code() != StatusCode::OK {
        anyhow::bail!("submit failed: {}", resp.status_code());
    }
    Ok(())
}

/// Poll until the registry drains or the deadline passes.
async fn wait_for_eviction(state: &PulseState) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    loop {
        if state.registry.is_empty().await {
            return Ok(());
        }
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("job never evicted");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// ── Completed ─────────────────────────────────────────────────────────

#[tokio::test]
async fn job_reaching_target_is_evicted() -> anyhow::Result<()> {
    let writes = Arc::new(AtomicU64::new(0));
    let base = spawn_stub(StatusCode::OK, Duration::ZERO, Arc::clone(&writes)).await?;
    let state = test_state(&base, 3, 100);
    let server = TestServer::new(build_router(Arc::clone(&state))).expect("test server");

    submit(&server).await?;
    wait_for_eviction(&state).await?;

    // Exactly the target number of writes went out.
    assert_eq!(writes.load(Ordering::Relaxed), 3);
    let sessions: serde_json::Value = server.get("/api/sessions").await.json();
    assert_eq!(sessions, serde_json::json!([]));
    Ok(())
}

// ── Failed ────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_write_evicts_job_without_retry() -> anyhow::Result<()> {
    let writes = Arc::new(AtomicU64::new(0));
    let base =
        spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO, Arc::clone(&writes)).await?;
    let state = test_state(&base, 1000, 50);
    let server = TestServer::new(build_router(Arc::clone(&state))).expect("test server");

    submit(&server).await?;
    wait_for_eviction(&state).await?;

    // A single failed tick terminates the job; nothing retried it.
    assert_eq!(writes.load(Ordering::Relaxed), 1);
    let sessions: serde_json::Value = server.get("/api/sessions").await.json();
    assert_eq!(sessions, serde_json::json!([]));
    Ok(())
}

// ── TimedOut ──────────────────────────────────────────────────────────

#[tokio::test]
async fn stalled_writes_hit_the_deadline() -> anyhow::Result<()> {
    let writes = Arc::new(AtomicU64::new(0));
    // Each write stalls past a full interval; the 150ms deadline (3 * 50ms)
    // fires long before three writes could ever land.
    let base = spawn_stub(StatusCode::OK, Duration::from_millis(150), Arc::clone(&writes)).await?;
    let state = test_state(&base, 3, 50);
    let server = TestServer::new(build_router(Arc::clone(&state))).expect("test server");

    submit(&server).await?;
    wait_for_eviction(&state).await?;

    assert!(writes.load(Ordering::Relaxed) < 3);
    let sessions: serde_json::Value = server.get("/api/sessions").await.json();
    assert_eq!(sessions, serde_json::json!([]));
    Ok(())
}

// ── progress visibility ───────────────────────────────────────────────

#[tokio::test]
async fn count_is_monotonic_while_running() -> anyhow::Result<()> {
    let writes = Arc::new(AtomicU64::new(0));
    let base = spawn_stub(StatusCode::OK, Duration::ZERO, Arc::clone(&writes)).await?;
    let state = test_state(&base, 50, 40);
    let server = TestServer::new(build_router(Arc::clone(&state))).expect("test server");

    submit(&server).await?;

    let mut last = 0u64;
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        let Some(entry) = state.registry.list_all().await.into_iter().next() else {
            break; // evicted on completion
        };
        let count = entry.completed.load(Ordering::Relaxed);
        assert!(count >= last, "count went backwards: {count} < {last}");
        assert!(count <= entry.target);
        last = count;
        tokio::time::sleep(Duration::from_millis(15)).await;
    }
    Ok(())
}
