// src/events/correlation.rs
//! Request/response correlation
//!
//! Thread-safe mapping from correlation id to the time its `api_call` was
//! emitted. Entries are pruned on a bounded time budget so abandoned
//! requests never grow the table without bound; a response arriving after
//! its entry was pruned (or past the window) resolves as unmatched.

use crate::events::schema::{Correlation, CorrelationId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;
use ulid::Ulid;

/// Correlation table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// How long an unanswered `api_call` stays matchable.
    pub prune_window_ms: u64,

    /// How often the prune task wakes.
    pub prune_interval_ms: u64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            prune_window_ms: 120_000,
            prune_interval_ms: 5_000,
        }
    }
}

/// Pending-call table.
pub struct CorrelationTable {
    pending: DashMap<CorrelationId, Instant>,
    window: Duration,
    pruned: AtomicU64,
}

impl CorrelationTable {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            window,
            pruned: AtomicU64::new(0),
        }
    }

    /// Allocate a fresh id and register it as pending.
    pub fn allocate(&self) -> CorrelationId {
        let id = Ulid::new();
        self.pending.insert(id, Instant::now());
        id
    }

    /// Resolve a response against its pending call. Consumes the entry.
    pub fn resolve(&self, id: CorrelationId) -> Correlation {
        match self.pending.remove(&id) {
            Some((id, registered)) if registered.elapsed() <= self.window => {
                Correlation::Matched(id)
            }
            Some(_) => Correlation::Unmatched,
            None => Correlation::Unmatched,
        }
    }

    /// Drop entries older than the window. Pruned entries are implicit
    /// data loss, not an error.
    pub fn prune(&self) -> usize {
        let before = self.pending.len();
        let window = self.window;
        self.pending.retain(|_, registered| registered.elapsed() <= window);
        let removed = before.saturating_sub(self.pending.len());
        if removed > 0 {
            self.pruned.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed, "pruned unmatched correlation entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total entries ever pruned.
    pub fn pruned_total(&self) -> u64 {
        self.pruned.load(Ordering::Relaxed)
    }
}
