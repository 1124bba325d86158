// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job repeater: a cancellable tick loop plus a one-shot deadline.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::state::{JobEntry, JobKey, PulseState};
use crate::upstream::client::UpstreamClient;

/// Terminal state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Reached its target count.
    Completed,
    /// A write call failed; the job does not retry.
    Failed,
    /// The deadline elapsed before the target was reached.
    TimedOut,
}

impl JobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Spawn the repeater tasks for a freshly registered job.
///
/// Two tasks share the entry's cancel token: the tick loop and a deadline
/// armed for `target * interval`. Whichever finishes the job first cancels
/// the token, which stops the other; cancellation is idempotent, so racing
/// terminal transitions are harmless.
pub fn spawn_repeater(state: Arc<PulseState>, key: JobKey, entry: Arc<JobEntry>) {
    let deadline = u32::try_from(entry.target)
        .ok()
        .and_then(|t| entry.interval.checked_mul(t))
        .unwrap_or(Duration::MAX);

    // Tick loop
    {
        let state = Arc::clone(&state);
        let entry = Arc::clone(&entry);
        tokio::spawn(async move {
            let client = UpstreamClient::new(&state.config);
            let mut interval = tokio::time::interval(entry.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = entry.cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                match client.perform_write(entry.id, &entry.access_token, &entry.cookie_header).await
                {
                    Ok(()) => {
                        let done = entry.completed.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::debug!(job = %key, done, target = entry.target, "tick ok");
                        if done >= entry.target {
                            finish_job(&state, key, JobOutcome::Completed).await;
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(job = %key, err = %e, "write failed");
                        finish_job(&state, key, JobOutcome::Failed).await;
                        break;
                    }
                }
            }
        });
    }

    // Deadline
    {
        let state = Arc::clone(&state);
        let entry = Arc::clone(&entry);
        tokio::spawn(async move {
            tokio::select! {
                _ = entry.cancel.cancelled() => {}
                _ = tokio::time::sleep(deadline) => {
                    finish_job(&state, key, JobOutcome::TimedOut).await;
                }
            }
        });
    }
}

/// Single exit path for every terminal transition.
///
/// Cancels the job's token and removes the registry entry. The registry
/// removal is idempotent, so a tick and the deadline racing to finish the
/// same job log it exactly once.
pub async fn finish_job(state: &PulseState, key: JobKey, outcome: JobOutcome) {
    if let Some(entry) = state.registry.remove(key).await {
        entry.cancel.cancel();
        tracing::info!(
            job = %key,
            outcome = outcome.as_str(),
            completed = entry.completed.load(Ordering::Relaxed),
            target = entry.target,
            elapsed_ms = entry.created_at.elapsed().as_millis() as u64,
            "job finished"
        );
    }
}
