use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::dispatch::CompletionResult;

#[derive(Debug, Default)]
pub struct Stats {
    pub submitted: AtomicU64,
    pub accepted: AtomicU64,
    pub rejected: AtomicU64,
    pub transport_failures: AtomicU64,
    pub serialization_failures: AtomicU64,
    pub cancelled: AtomicU64,

    // Last observed value only, gauge-like
    pub last_dispatch_latency_ms: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_serialization_failures(&self) {
        self.serialization_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, result: &CompletionResult) {
        let counter = match result {
            CompletionResult::Accepted => &self.accepted,
            CompletionResult::Rejected(_) => &self.rejected,
            CompletionResult::TransportFailure(_) => &self.transport_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_dispatch_latency(&self, ms: u64) {
        self.last_dispatch_latency_ms.store(ms, Ordering::Relaxed);
    }

    /// Requests submitted but not yet resolved.
    pub fn in_flight(&self) -> u64 {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let resolved = self.accepted.load(Ordering::Relaxed)
            + self.rejected.load(Ordering::Relaxed)
            + self.transport_failures.load(Ordering::Relaxed);
        submitted.saturating_sub(resolved)
    }

    pub fn log_stats(&self) {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let accepted = self.accepted.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let failed = self.transport_failures.load(Ordering::Relaxed);
        let unserializable = self.serialization_failures.load(Ordering::Relaxed);
        let cancelled = self.cancelled.load(Ordering::Relaxed);
        let latency = self.last_dispatch_latency_ms.load(Ordering::Relaxed);

        info!(
            "STATS: Submitted: {} | Accepted: {} | Rejected: {} | Transport failures: {} | Unserializable: {} | Cancelled: {} | Last latency: {}ms",
            submitted, accepted, rejected, failed, unserializable, cancelled, latency
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_stats_concurrency() {
        let stats = Arc::new(Stats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let stats = stats.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.inc_submitted();
                    stats.record_outcome(&CompletionResult::Accepted);
                    stats.update_dispatch_latency(50);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(stats.submitted.load(Ordering::Relaxed), 1000);
        assert_eq!(stats.accepted.load(Ordering::Relaxed), 1000);
        assert_eq!(stats.last_dispatch_latency_ms.load(Ordering::Relaxed), 50);
        assert_eq!(stats.in_flight(), 0);
    }

    #[test]
    fn test_outcomes_land_in_their_counters() {
        let stats = Stats::new();
        for _ in 0..4 {
            stats.inc_submitted();
        }
        stats.record_outcome(&CompletionResult::Accepted);
        stats.record_outcome(&CompletionResult::Rejected(500));
        stats.record_outcome(&CompletionResult::TransportFailure("refused".into()));

        assert_eq!(stats.accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.rejected.load(Ordering::Relaxed), 1);
        assert_eq!(stats.transport_failures.load(Ordering::Relaxed), 1);
        assert_eq!(stats.in_flight(), 1);
    }
}
