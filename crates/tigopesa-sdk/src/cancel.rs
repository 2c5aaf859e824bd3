//! Caller-owned cancellation scope.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Clonable cancellation handle shared by a client and its caller.
///
/// Every outbound call and inbound handler invocation made through a
/// client races its scope; once [`CancelScope::cancel`] is called, all
/// in-flight and future calls fail with a cancellation error. Clones
/// observe the same state.
#[derive(Debug, Clone)]
pub struct CancelScope {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelScope {
    /// A scope that has not been cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel the scope. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// `true` once [`CancelScope::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves when the scope is cancelled; never resolves otherwise.
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            // The sender lives as long as `self`'s clones; if every clone is
            // gone nobody can cancel any more.
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_waiters() {
        let scope = CancelScope::new();
        let waiter = tokio::spawn(scope.cancelled());
        assert!(!scope.is_cancelled());

        scope.clone().cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_resolves_immediately() {
        let scope = CancelScope::new();
        scope.cancel();
        tokio::time::timeout(Duration::from_millis(100), scope.cancelled())
            .await
            .expect("should resolve at once");
    }

    #[tokio::test]
    async fn uncancelled_scope_stays_pending() {
        let scope = CancelScope::new();
        let result = tokio::time::timeout(Duration::from_millis(20), scope.cancelled()).await;
        assert!(result.is_err());
    }
}
