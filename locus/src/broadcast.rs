//! Change notification fan-out.
//!
//! [`ChangeBroadcaster`] carries no payload. It only signals that the current
//! location changed; observers pull the value from the service. That keeps
//! observers from racing on a pushed value that may already be stale.
//!
//! # Ownership
//!
//! The broadcaster holds `Weak` references only. Dropping the last `Arc` of an
//! observer is enough to stop its notifications; the dead registration is
//! pruned on the next publish.
//!
//! # Thread Safety
//!
//! `publish` may run concurrently from several threads. The registration list
//! is snapshotted under a read lock and released before any observer runs, so
//! handlers may subscribe or unsubscribe without deadlocking. Handlers that
//! touch UI-owned state must hop to the UI thread themselves.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Receives "location changed" signals.
///
/// Implemented for any `Fn() + Send + Sync` closure.
pub trait ChangeObserver: Send + Sync {
    /// Called once per publish while registered.
    fn on_location_changed(&self);
}

impl<F> ChangeObserver for F
where
    F: Fn() + Send + Sync,
{
    fn on_location_changed(&self) {
        self()
    }
}

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Registration {
    id: SubscriptionId,
    observer: Weak<dyn ChangeObserver>,
}

impl Registration {
    fn is_for(&self, ptr: *const ()) -> bool {
        Weak::as_ptr(&self.observer) as *const () == ptr
    }
}

/// Outcome of one publish round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Observers whose handler returned normally.
    pub delivered: usize,
    /// Observers whose handler panicked.
    pub failed: usize,
    /// Registrations dropped because the observer no longer exists.
    pub pruned: usize,
}

/// In-process publish/subscribe channel for location changes.
pub struct ChangeBroadcaster {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBroadcaster {
    /// Create a broadcaster with no observers.
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `observer` without taking ownership of it.
    ///
    /// Subscribing the same observer twice returns the existing id.
    pub fn subscribe<O>(&self, observer: &Arc<O>) -> SubscriptionId
    where
        O: ChangeObserver + 'static,
    {
        let ptr = Arc::as_ptr(observer) as *const ();
        let mut registrations = self.registrations.write();
        // A dead registration may share an address with a new allocation.
        registrations.retain(|r| r.observer.strong_count() > 0);

        if let Some(existing) = registrations.iter().find(|r| r.is_for(ptr)) {
            return existing.id;
        }

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let weak = Arc::downgrade(observer) as Weak<dyn ChangeObserver>;
        registrations.push(Registration { id, observer: weak });
        tracing::debug!(id = id.0, observers = registrations.len(), "Observer subscribed");
        id
    }

    /// Remove a registration. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        let removed = registrations.len() != before;
        if removed {
            tracing::debug!(id = id.0, observers = registrations.len(), "Observer unsubscribed");
        }
        removed
    }

    /// Number of registrations, including ones whose observer has been dropped
    /// but not yet pruned.
    pub fn subscriber_count(&self) -> usize {
        self.registrations.read().len()
    }

    /// Signal every registered observer, in registration order.
    ///
    /// A panicking handler is logged and does not stop delivery to the rest.
    pub fn publish(&self) -> PublishReport {
        let snapshot: Vec<(SubscriptionId, Weak<dyn ChangeObserver>)> = self
            .registrations
            .read()
            .iter()
            .map(|r| (r.id, r.observer.clone()))
            .collect();

        let mut report = PublishReport::default();
        let mut dead = Vec::new();

        for (id, weak) in snapshot {
            let Some(observer) = weak.upgrade() else {
                dead.push(id);
                continue;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_location_changed())) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    report.failed += 1;
                    tracing::warn!(id = id.0, "Observer panicked while handling location change");
                }
            }
        }

        if !dead.is_empty() {
            let mut registrations = self.registrations.write();
            registrations.retain(|r| !dead.contains(&r.id));
            report.pruned = dead.len();
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    struct Counter(AtomicUsize);

    impl Counter {
        fn new() -> Arc<Self> {
            Arc::new(Self(AtomicUsize::new(0)))
        }

        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl ChangeObserver for Counter {
        fn on_location_changed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Faulty;

    impl ChangeObserver for Faulty {
        fn on_location_changed(&self) {
            panic!("observer failure");
        }
    }

    #[test]
    fn test_publish_reaches_each_observer_once_in_order() {
        let broadcaster = ChangeBroadcaster::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let observers: Vec<_> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                Arc::new(move || order.lock().push(i))
            })
            .collect();
        for observer in &observers {
            broadcaster.subscribe(observer);
        }

        let report = broadcaster.publish();

        assert_eq!(report.delivered, 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let broadcaster = ChangeBroadcaster::new();
        let counter = Counter::new();

        let first = broadcaster.subscribe(&counter);
        let second = broadcaster.subscribe(&counter);

        assert_eq!(first, second);
        assert_eq!(broadcaster.subscriber_count(), 1);
        broadcaster.publish();
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_unsubscribed_observer_not_notified() {
        let broadcaster = ChangeBroadcaster::new();
        let kept = Counter::new();
        let removed = Counter::new();

        broadcaster.subscribe(&kept);
        let id = broadcaster.subscribe(&removed);
        assert!(broadcaster.unsubscribe(id));
        assert!(!broadcaster.unsubscribe(id));

        broadcaster.publish();

        assert_eq!(kept.count(), 1);
        assert_eq!(removed.count(), 0);
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let broadcaster = ChangeBroadcaster::new();
        let counter = Counter::new();
        broadcaster.subscribe(&counter);
        drop(counter);

        let report = broadcaster.publish();

        assert_eq!(report.delivered, 0);
        assert_eq!(report.pruned, 1);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_panicking_observer_does_not_block_others() {
        let broadcaster = ChangeBroadcaster::new();
        let before = Counter::new();
        let faulty = Arc::new(Faulty);
        let after = Counter::new();

        broadcaster.subscribe(&before);
        broadcaster.subscribe(&faulty);
        broadcaster.subscribe(&after);

        let report = broadcaster.publish();

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 2);
        assert_eq!(before.count(), 1);
        assert_eq!(after.count(), 1);
    }

    #[test]
    fn test_observer_can_unsubscribe_during_publish() {
        let broadcaster = Arc::new(ChangeBroadcaster::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let observer = {
            let broadcaster = Arc::clone(&broadcaster);
            let slot = Arc::clone(&slot);
            Arc::new(move || {
                if let Some(id) = slot.lock().take() {
                    broadcaster.unsubscribe(id);
                }
            })
        };
        *slot.lock() = Some(broadcaster.subscribe(&observer));

        broadcaster.publish();

        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_concurrent_publish() {
        let broadcaster = Arc::new(ChangeBroadcaster::new());
        let counter = Counter::new();
        broadcaster.subscribe(&counter);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let broadcaster = Arc::clone(&broadcaster);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        broadcaster.publish();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.count(), 800);
    }
}
