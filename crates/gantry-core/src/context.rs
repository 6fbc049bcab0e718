//! Per-invocation execution context.
//!
//! [`ExecutionContext`] is the deferred-work handle a worker receives on
//! every invocation. Work registered through [`ExecutionContext::wait_until`]
//! runs on the Tokio runtime without delaying the response. The facade
//! passes this handle through to middleware and the terminal handler
//! unmodified: clones share the same underlying state, so whatever the host
//! environment promises about deferred work is preserved end to end.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for registering deferred work scoped to one invocation.
///
/// Must be used from within a Tokio runtime.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    inner: Arc<ContextInner>,
}

#[derive(Default)]
struct ContextInner {
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ExecutionContext {
    /// Creates a fresh execution context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers deferred work.
    ///
    /// The future is spawned immediately and runs concurrently with the
    /// rest of the invocation; nothing awaits it on the response path.
    pub fn wait_until<F>(&self, fut: F)
    where
        F: Future + Send + 'static,
        F::Output: Send,
    {
        let handle = tokio::spawn(async move {
            let _ = fut.await;
        });
        let mut pending = self.inner.pending.lock();
        pending.push(handle);
        tracing::debug!(pending = pending.len(), "registered deferred task");
    }

    /// Returns the number of deferred tasks not yet collected by
    /// [`drained`](Self::drained).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Waits for all deferred work registered so far to finish.
    ///
    /// Used by tests and local harnesses to observe background effects;
    /// the facade never calls this on the response path. Work registered
    /// while draining is collected too.
    pub async fn drained(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.inner.pending.lock());
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                let _ = handle.await;
            }
        }
    }

    /// Returns true if both handles refer to the same underlying context.
    #[must_use]
    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_wait_until_runs_without_blocking() {
        let ctx = ExecutionContext::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        ctx.wait_until(async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        ctx.drained().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let ctx = ExecutionContext::new();
        let clone = ctx.clone();
        assert!(ctx.shares_state_with(&clone));

        clone.wait_until(async {});
        assert_eq!(ctx.pending_count(), 1);
        ctx.drained().await;
    }

    #[tokio::test]
    async fn test_distinct_contexts() {
        let a = ExecutionContext::new();
        let b = ExecutionContext::new();
        assert!(!a.shares_state_with(&b));
    }

    #[tokio::test]
    async fn test_drained_collects_nested_work() {
        let ctx = ExecutionContext::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_ctx = ctx.clone();
        let c = counter.clone();
        ctx.wait_until(async move {
            let c2 = c.clone();
            inner_ctx.wait_until(async move {
                c2.fetch_add(1, Ordering::SeqCst);
            });
            c.fetch_add(1, Ordering::SeqCst);
        });

        ctx.drained().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
