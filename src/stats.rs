//! Per-outcome query counters for the periodic stats line.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How a single query was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Served from the freshness cache.
    Cached,
    /// Answered NXDOMAIN from the blocklist.
    Blocked,
    /// Forwarded upstream and answered with the upstream's reply.
    Forwarded,
    /// Forward failed; answered NXDOMAIN.
    Failed,
}

/// Atomic counters shared by all query tasks.
pub struct Stats {
    cached: AtomicU64,
    blocked: AtomicU64,
    forwarded: AtomicU64,
    failed: AtomicU64,
    /// Cumulative handling time in microseconds, for averaging.
    total_handle_us: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            cached: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            total_handle_us: AtomicU64::new(0),
        }
    }

    pub fn record(&self, outcome: Outcome, elapsed: Duration) {
        let counter = match outcome {
            Outcome::Cached => &self.cached,
            Outcome::Blocked => &self.blocked,
            Outcome::Forwarded => &self.forwarded,
            Outcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_handle_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Take the current counters and reset them for the next window.
    pub fn snapshot_and_reset(&self) -> StatsSnapshot {
        let cached = self.cached.swap(0, Ordering::Relaxed);
        let blocked = self.blocked.swap(0, Ordering::Relaxed);
        let forwarded = self.forwarded.swap(0, Ordering::Relaxed);
        let failed = self.failed.swap(0, Ordering::Relaxed);
        let total_us = self.total_handle_us.swap(0, Ordering::Relaxed);

        let requests = cached + blocked + forwarded + failed;
        let avg_handle_ms = if requests > 0 {
            (total_us as f64 / requests as f64) / 1000.0
        } else {
            0.0
        };

        StatsSnapshot {
            requests,
            cached,
            blocked,
            forwarded,
            failed,
            avg_handle_ms,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StatsSnapshot {
    pub requests: u64,
    pub cached: u64,
    pub blocked: u64,
    pub forwarded: u64,
    pub failed: u64,
    pub avg_handle_ms: f64,
}
