//! Pool statistics
//!
//! Counters shared between the dispatcher, the workers and the completion
//! sink.

use super::channel::SessionOutcome;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::info;

/// Statistics for the worker pool
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Connections handed to the pool
    pub total_accepted: AtomicUsize,
    /// Sessions currently owned by a worker
    pub active_count: AtomicUsize,
    /// Connections closed by the completion sink
    pub total_completed: AtomicUsize,
    /// Sessions that ended in the handshake
    pub handshake_failures: AtomicUsize,
    /// Sessions whose destination could not be reached
    pub dial_failures: AtomicUsize,
    /// Sessions whose relay ended with an error
    pub relay_errors: AtomicUsize,
    /// Sessions dropped by an aborted worker
    pub aborted: AtomicUsize,
    /// Bytes copied client -> destination
    pub bytes_upstream: AtomicU64,
    /// Bytes copied destination -> client
    pub bytes_downstream: AtomicU64,
}

impl PoolStats {
    /// Create new pool stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection entering the pending queue
    pub fn record_accepted(&self) {
        self.total_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker picking a connection up
    pub fn record_started(&self) {
        self.active_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection reaching the completion sink
    pub fn record_completed(&self, outcome: &SessionOutcome) {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        self.total_completed.fetch_add(1, Ordering::Relaxed);

        match outcome {
            SessionOutcome::Relayed(stats) => {
                self.bytes_upstream.fetch_add(stats.upstream, Ordering::Relaxed);
                self.bytes_downstream
                    .fetch_add(stats.downstream, Ordering::Relaxed);
            }
            SessionOutcome::HandshakeFailed => {
                self.handshake_failures.fetch_add(1, Ordering::Relaxed);
            }
            SessionOutcome::DialFailed => {
                self.dial_failures.fetch_add(1, Ordering::Relaxed);
            }
            SessionOutcome::RelayFailed => {
                self.relay_errors.fetch_add(1, Ordering::Relaxed);
            }
            SessionOutcome::Aborted => {
                self.aborted.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            total_accepted: self.total_accepted.load(Ordering::Relaxed),
            active_count: self.active_count.load(Ordering::Relaxed),
            total_completed: self.total_completed.load(Ordering::Relaxed),
            handshake_failures: self.handshake_failures.load(Ordering::Relaxed),
            dial_failures: self.dial_failures.load(Ordering::Relaxed),
            relay_errors: self.relay_errors.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            bytes_upstream: self.bytes_upstream.load(Ordering::Relaxed),
            bytes_downstream: self.bytes_downstream.load(Ordering::Relaxed),
        }
    }

    /// Log pool health status
    pub fn log_health(&self) {
        let stats = self.snapshot();
        info!(
            "Pool health: accepted={}, active={}, completed={}, handshake_failures={}, dial_failures={}, relay_errors={}, aborted={}, up={}B, down={}B",
            stats.total_accepted,
            stats.active_count,
            stats.total_completed,
            stats.handshake_failures,
            stats.dial_failures,
            stats.relay_errors,
            stats.aborted,
            stats.bytes_upstream,
            stats.bytes_downstream
        );
    }
}

/// Snapshot of pool statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Connections handed to the pool
    pub total_accepted: usize,
    /// Sessions currently owned by a worker
    pub active_count: usize,
    /// Connections closed by the completion sink
    pub total_completed: usize,
    /// Sessions that ended in the handshake
    pub handshake_failures: usize,
    /// Sessions whose destination could not be reached
    pub dial_failures: usize,
    /// Sessions whose relay ended with an error
    pub relay_errors: usize,
    /// Sessions dropped by an aborted worker
    pub aborted: usize,
    /// Bytes copied client -> destination
    pub bytes_upstream: u64,
    /// Bytes copied destination -> client
    pub bytes_downstream: u64,
}
