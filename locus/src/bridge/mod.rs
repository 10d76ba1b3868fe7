//! Bounded waits on callback-based operations.
//!
//! Some collaborators (reverse geocoding, notably) only answer through a
//! completion callback. [`AsyncBridge`] turns such an operation into a call
//! that returns a value or gives up at a deadline.
//!
//! # Contract
//!
//! - The body receives a [`Resolver`] and starts the operation.
//! - The caller waits until `resolve` is called or the deadline elapses.
//! - The first `resolve` wins; later ones, and any that arrive after the
//!   waiter gave up, are discarded without error.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use locus::bridge::AsyncBridge;
//!
//! let bridge = AsyncBridge::new();
//! let answer = bridge.run_blocking(Duration::from_secs(1), |resolver| {
//!     std::thread::spawn(move || {
//!         resolver.resolve(42);
//!     });
//! });
//! assert_eq!(answer, Ok(42));
//! ```
//!
//! # Deadlock
//!
//! `run_blocking` parks the calling thread. It must never run on the thread
//! (or single-threaded runtime) that is expected to deliver the callback.

mod pending;
mod stats;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::BridgeError;
use stats::BridgeMetrics;

pub use pending::{Canceller, PendingCall, Resolver};
pub use stats::BridgeStats;

/// Converts callback-based operations into bounded waits.
#[derive(Debug, Default, Clone)]
pub struct AsyncBridge {
    metrics: Arc<BridgeMetrics>,
}

impl AsyncBridge {
    /// Create a bridge with fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending call and its resolver without running anything.
    ///
    /// Use this when the waiter needs a [`Canceller`] before blocking.
    pub fn pending<T>(&self, timeout: Duration) -> (PendingCall<T>, Resolver<T>) {
        PendingCall::new(timeout, Arc::clone(&self.metrics))
    }

    /// Run `body` and block the calling thread until it resolves or `timeout`
    /// elapses.
    pub fn run_blocking<T, F>(&self, timeout: Duration, body: F) -> Result<T, BridgeError>
    where
        F: FnOnce(Resolver<T>),
    {
        let (call, resolver) = self.pending(timeout);
        body(resolver);
        let result = call.wait();
        if let Err(e) = &result {
            tracing::debug!(error = %e, "Blocking bridge call produced no value");
        }
        result
    }

    /// Run `body` and await its resolution for at most `timeout`.
    pub async fn run_async<T, F>(&self, timeout: Duration, body: F) -> Result<T, BridgeError>
    where
        F: FnOnce(Resolver<T>),
    {
        let never = CancellationToken::new();
        self.run_async_cancellable(timeout, &never, body).await
    }

    /// Like [`run_async`](Self::run_async), but gives up early when `token`
    /// is cancelled.
    pub async fn run_async_cancellable<T, F>(
        &self,
        timeout: Duration,
        token: &CancellationToken,
        body: F,
    ) -> Result<T, BridgeError>
    where
        F: FnOnce(Resolver<T>),
    {
        let (tx, rx) = oneshot::channel();
        self.metrics.call_started();
        body(Resolver::channel(tx, Arc::clone(&self.metrics)));

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(BridgeError::Cancelled),
            received = tokio::time::timeout(timeout, rx) => match received {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(_)) => Err(BridgeError::Dropped),
                Err(_) => Err(BridgeError::Timeout(timeout)),
            },
        };

        match &outcome {
            Ok(_) => self.metrics.call_resolved(),
            Err(BridgeError::Timeout(_)) => self.metrics.call_timed_out(),
            Err(BridgeError::Cancelled) => self.metrics.call_cancelled(),
            Err(BridgeError::Dropped) => self.metrics.call_dropped(),
        }
        if let Err(e) = &outcome {
            tracing::debug!(error = %e, "Async bridge call produced no value");
        }
        outcome
    }

    /// Snapshot of this bridge's counters.
    pub fn stats(&self) -> BridgeStats {
        self.metrics.snapshot()
    }
}
