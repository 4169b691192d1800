//! One-shot cancellation signal propagated to the engine's suspension points
//! (CPI provider, config fetcher, feature flags, audit/compliance-check
//! sinks). Shaped like `tokio_util::sync::CancellationToken` but implemented
//! locally on `tokio::sync::Notify` so the workspace doesn't pick up
//! `tokio-util` for a single one-shot flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Clone-able, shareable cancellation flag. Cancelling is idempotent and
/// wakes every outstanding [`CancellationSignal::cancelled`] waiter.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves immediately if already cancelled, otherwise waits for the
    /// next [`CancellationSignal::cancel`] call.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_observed_by_waiters() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });

        signal.cancel();
        handle.await.unwrap();
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_once_already_cancelled() {
        let signal = CancellationSignal::new();
        signal.cancel();
        signal.cancel();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }
}
