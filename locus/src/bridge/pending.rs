//! One bridged call: a result slot, its resolver and its waiter.
//!
//! Exactly one waiter reads the slot; any number of cloned resolvers may try
//! to write it, but only the first write counts. Once the waiter has left
//! (value taken, deadline elapsed or cancelled) the slot is closed and every
//! later write is discarded without error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::oneshot;

use super::stats::BridgeMetrics;
use crate::error::BridgeError;

#[derive(Debug)]
struct SlotState<T> {
    value: Option<T>,
    /// A value has been written (it may already have been taken).
    resolved: bool,
    /// The waiter has left; no write can reach it any more.
    closed: bool,
    cancelled: bool,
    /// Live `Resolver` handles for this slot.
    resolvers: usize,
}

#[derive(Debug)]
struct Slot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                resolved: false,
                closed: false,
                cancelled: false,
                resolvers: 1,
            }),
            ready: Condvar::new(),
        }
    }
}

enum Target<T> {
    Slot(Arc<Slot<T>>),
    Channel(Arc<Mutex<Option<oneshot::Sender<T>>>>),
}

/// Completion handle handed to the body of a bridged call.
///
/// Cloneable; the first `resolve` across all clones wins. Dropping every clone
/// without resolving ends the call early with [`BridgeError::Dropped`].
pub struct Resolver<T> {
    target: Target<T>,
    metrics: Arc<BridgeMetrics>,
}

impl<T> Resolver<T> {
    pub(crate) fn channel(sender: oneshot::Sender<T>, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            target: Target::Channel(Arc::new(Mutex::new(Some(sender)))),
            metrics,
        }
    }

    /// Deliver `value` to the waiter.
    ///
    /// Returns false, and drops `value`, if the call was already resolved or
    /// the waiter has left.
    pub fn resolve(&self, value: T) -> bool {
        let accepted = match &self.target {
            Target::Slot(slot) => {
                let mut state = slot.state.lock();
                if state.resolved || state.closed {
                    false
                } else {
                    state.value = Some(value);
                    state.resolved = true;
                    slot.ready.notify_all();
                    true
                }
            }
            Target::Channel(sender) => match sender.lock().take() {
                Some(tx) => tx.send(value).is_ok(),
                None => false,
            },
        };

        if !accepted {
            self.metrics.resolution_discarded();
            tracing::trace!("Bridge resolution discarded");
        }
        accepted
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Slot(slot) => {
                slot.state.lock().resolvers += 1;
                Target::Slot(Arc::clone(slot))
            }
            Target::Channel(sender) => Target::Channel(Arc::clone(sender)),
        };
        Self {
            target,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        // Channel targets signal this through the dropped sender.
        if let Target::Slot(slot) = &self.target {
            let mut state = slot.state.lock();
            state.resolvers -= 1;
            if state.resolvers == 0 && !state.resolved {
                slot.ready.notify_all();
            }
        }
    }
}

/// Lets another thread abandon a blocking wait.
#[derive(Clone)]
pub struct Canceller<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Canceller<T> {
    /// Wake the waiter with [`BridgeError::Cancelled`].
    ///
    /// Returns false if the call already settled.
    pub fn cancel(&self) -> bool {
        let mut state = self.slot.state.lock();
        if state.closed || state.resolved || state.cancelled {
            return false;
        }
        state.cancelled = true;
        self.slot.ready.notify_all();
        true
    }
}

/// The waiting side of a blocking bridged call.
pub struct PendingCall<T> {
    slot: Arc<Slot<T>>,
    timeout: Duration,
    /// `None` when `timeout` runs past what `Instant` can represent.
    deadline: Option<Instant>,
    metrics: Arc<BridgeMetrics>,
}

impl<T> PendingCall<T> {
    pub(crate) fn new(timeout: Duration, metrics: Arc<BridgeMetrics>) -> (Self, Resolver<T>) {
        let slot = Arc::new(Slot::new());
        metrics.call_started();

        let resolver = Resolver {
            target: Target::Slot(Arc::clone(&slot)),
            metrics: Arc::clone(&metrics),
        };
        let call = Self {
            slot,
            timeout,
            deadline: Instant::now().checked_add(timeout),
            metrics,
        };
        (call, resolver)
    }

    /// A handle for abandoning this wait from another thread.
    pub fn canceller(&self) -> Canceller<T> {
        Canceller {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Block the calling thread until the call resolves, is cancelled, loses
    /// all its resolvers, or the deadline passes.
    ///
    /// Must not run on the thread expected to invoke the resolver.
    pub fn wait(self) -> Result<T, BridgeError> {
        let mut state = self.slot.state.lock();
        loop {
            if let Some(value) = state.value.take() {
                state.closed = true;
                self.metrics.call_resolved();
                return Ok(value);
            }
            if state.cancelled {
                state.closed = true;
                self.metrics.call_cancelled();
                return Err(BridgeError::Cancelled);
            }
            if state.resolvers == 0 && !state.resolved {
                state.closed = true;
                self.metrics.call_dropped();
                return Err(BridgeError::Dropped);
            }
            match self.deadline {
                Some(deadline) if Instant::now() >= deadline => {
                    state.closed = true;
                    self.metrics.call_timed_out();
                    return Err(BridgeError::Timeout(self.timeout));
                }
                Some(deadline) => {
                    self.slot.ready.wait_until(&mut state, deadline);
                }
                None => self.slot.ready.wait(&mut state),
            }
        }
    }
}

impl<T> Drop for PendingCall<T> {
    fn drop(&mut self) {
        // A waiter dropped without waiting still closes the slot.
        self.slot.state.lock().closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn pending<T>(timeout: Duration) -> (PendingCall<T>, Resolver<T>, Arc<BridgeMetrics>) {
        let metrics = Arc::new(BridgeMetrics::default());
        let (call, resolver) = PendingCall::new(timeout, Arc::clone(&metrics));
        (call, resolver, metrics)
    }

    #[test]
    fn test_resolve_before_wait_is_kept() {
        let (call, resolver, _) = pending(Duration::from_secs(1));
        assert!(resolver.resolve(7));
        assert_eq!(call.wait(), Ok(7));
    }

    #[test]
    fn test_first_write_wins() {
        let (call, resolver, metrics) = pending(Duration::from_secs(1));
        let second = resolver.clone();

        assert!(resolver.resolve(1));
        assert!(!second.resolve(2));

        assert_eq!(call.wait(), Ok(1));
        assert_eq!(metrics.snapshot().discarded, 1);
    }

    #[test]
    fn test_late_resolve_after_timeout_is_discarded() {
        let (call, resolver, metrics) = pending::<u32>(Duration::from_millis(20));

        assert_eq!(
            call.wait(),
            Err(BridgeError::Timeout(Duration::from_millis(20)))
        );
        assert!(!resolver.resolve(42));

        let stats = metrics.snapshot();
        assert_eq!(stats.timed_out, 1);
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_all_resolvers_dropped_ends_wait() {
        let (call, resolver, _) = pending::<u32>(Duration::from_secs(5));
        let handle = thread::spawn(move || drop(resolver));

        let start = Instant::now();
        assert_eq!(call.wait(), Err(BridgeError::Dropped));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let (call, resolver, metrics) = pending::<u32>(Duration::from_secs(5));
        let canceller = call.canceller();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            assert!(canceller.cancel());
        });

        assert_eq!(call.wait(), Err(BridgeError::Cancelled));
        handle.join().unwrap();
        assert!(!resolver.resolve(1));
        assert_eq!(metrics.snapshot().cancelled, 1);
    }

    #[test]
    fn test_unrepresentable_timeout_waits_without_deadline() {
        let (call, resolver, metrics) = pending::<u32>(Duration::MAX);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            resolver.resolve(9);
        });

        assert_eq!(call.wait(), Ok(9));
        handle.join().unwrap();
        assert_eq!(metrics.snapshot().resolved, 1);
    }

    #[test]
    fn test_unrepresentable_timeout_still_cancellable() {
        let (call, _resolver, _) = pending::<u32>(Duration::MAX);
        let canceller = call.canceller();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });

        assert_eq!(call.wait(), Err(BridgeError::Cancelled));
        handle.join().unwrap();
    }

    #[test]
    fn test_resolve_after_waiter_dropped_is_tolerated() {
        let (call, resolver, _) = pending::<String>(Duration::from_secs(1));
        drop(call);
        assert!(!resolver.resolve("late".to_string()));
    }
}
