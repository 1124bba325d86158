// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::PulseConfig;

/// Shared pulse state.
pub struct PulseState {
    pub registry: JobRegistry,
    pub config: PulseConfig,
    pub shutdown: CancellationToken,
}

impl PulseState {
    pub fn new(config: PulseConfig, shutdown: CancellationToken) -> Self {
        Self { registry: JobRegistry::new(), config, shutdown }
    }
}

/// Registry key: resolved resource id plus a process-wide sequence number.
///
/// The sequence keeps concurrent jobs for the same resource from colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub id: u64,
    pub seq: u64,
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.seq)
    }
}

/// An active repeating job.
///
/// Durable state lives here; the repeater tasks only hold `Arc` clones.
pub struct JobEntry {
    /// Resolved numeric id of the target resource.
    pub id: u64,
    /// Original resource reference supplied by the caller.
    pub url: String,
    /// Total repetitions requested.
    pub target: u64,
    /// Successful repetitions so far. Monotonically non-decreasing.
    pub completed: AtomicU64,
    /// Cadence between repetitions.
    pub interval: Duration,
    /// Normalized credential sent with every tick.
    pub cookie_header: String,
    /// Short-lived token authorizing the write action.
    pub access_token: String,
    pub created_at: Instant,
    /// Joint cancel for the tick loop and the deadline task.
    pub cancel: CancellationToken,
}

/// In-memory job registry. Insertion-ordered; single source of truth for
/// progress reporting.
pub struct JobRegistry {
    jobs: RwLock<IndexMap<JobKey, Arc<JobEntry>>>,
    next_seq: AtomicU64,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self { jobs: RwLock::new(IndexMap::new()), next_seq: AtomicU64::new(0) }
    }

    /// Mint a fresh key for a resolved id. Never collides with a live key.
    pub fn next_key(&self, id: u64) -> JobKey {
        JobKey { id, seq: self.next_seq.fetch_add(1, Ordering::Relaxed) }
    }

    /// Insert or overwrite.
    pub async fn put(&self, key: JobKey, entry: Arc<JobEntry>) {
        self.jobs.write().await.insert(key, entry);
    }

    pub async fn get(&self, key: JobKey) -> Option<Arc<JobEntry>> {
        self.jobs.read().await.get(&key).cloned()
    }

    /// Remove and return the entry. Removing an absent key is a no-op.
    ///
    /// `shift_remove` so the insertion order of the survivors holds.
    pub async fn remove(&self, key: JobKey) -> Option<Arc<JobEntry>> {
        self.jobs.write().await.shift_remove(&key)
    }

    /// Snapshot of all current entries in insertion order.
    pub async fn list_all(&self) -> Vec<Arc<JobEntry>> {
        self.jobs.read().await.values().map(Arc::clone).collect()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
