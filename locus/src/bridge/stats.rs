//! Lock-free bridge counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared by a bridge and the resolvers it hands out.
///
/// `Relaxed` ordering is enough: the counters are independent and only read
/// for reporting.
#[derive(Debug, Default)]
pub(crate) struct BridgeMetrics {
    started: AtomicU64,
    resolved: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    dropped: AtomicU64,
    discarded: AtomicU64,
}

impl BridgeMetrics {
    pub(crate) fn call_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn call_resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn call_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn call_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn call_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn resolution_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BridgeStats {
        BridgeStats {
            started: self.started.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a bridge's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Calls started.
    pub started: u64,
    /// Calls that returned a value to the waiter.
    pub resolved: u64,
    /// Calls whose deadline elapsed first.
    pub timed_out: u64,
    /// Calls abandoned by the waiter.
    pub cancelled: u64,
    /// Calls whose completion handler was dropped without resolving.
    pub dropped: u64,
    /// Resolutions ignored because the call was already settled.
    pub discarded: u64,
}

impl BridgeStats {
    /// Calls that have not settled yet.
    pub fn in_flight(&self) -> u64 {
        self.started.saturating_sub(
            self.resolved + self.timed_out + self.cancelled + self.dropped,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = BridgeMetrics::default();
        metrics.call_started();
        metrics.call_started();
        metrics.call_resolved();
        metrics.resolution_discarded();

        let stats = metrics.snapshot();
        assert_eq!(stats.started, 2);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.in_flight(), 1);
    }
}
