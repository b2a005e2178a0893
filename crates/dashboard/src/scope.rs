//! Per-view request lifetimes.
//!
//! Each mounted view owns a [`ViewScope`]. Requests issued by the view are
//! raced against the scope's cancellation token, so once the shell tears the
//! view down any in-flight call resolves to `ApiError::Cancelled` and its
//! result is never written into stale state.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::api::ApiError;

/// Cancellation scope tied to a view's mount/unmount.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    /// A fresh, live scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear the view down. In-flight and future requests are cancelled.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the view has been torn down.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A scope that is cancelled together with this one, and can also be
    /// cancelled on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Run a request inside the scope.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Cancelled` if the scope is cancelled before or
    /// while the request runs, otherwise the request's own result.
    pub async fn run<T, F>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(ApiError::Cancelled),
            result = request => {
                // A result that lands after teardown is dropped as well.
                if self.is_cancelled() {
                    Err(ApiError::Cancelled)
                } else {
                    result
                }
            }
        }
    }
}

/// Shared "operation in flight" flag for a view.
///
/// Observers (a render loop, a spinner) hold clones; the view enters the
/// flag for the duration of a mutation. The guard clears it on drop, so the
/// flag is released on success, failure and cancellation alike.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    /// A cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the view busy. Returns `None` if it already is.
    #[must_use]
    pub fn enter(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Clears its [`BusyFlag`] when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_live_scope_passes_result_through() {
        let scope = ViewScope::new();
        let value = scope.run(async { Ok::<_, ApiError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_scope_short_circuits() {
        let scope = ViewScope::new();
        scope.cancel();
        let result = scope.run(async { Ok::<_, ApiError>(7) }).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_during_request() {
        let scope = ViewScope::new();
        let canceller = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ApiError>(())
            })
            .await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[test]
    fn test_busy_flag_guard() {
        let flag = BusyFlag::new();
        let observer = flag.clone();
        {
            let guard = flag.enter();
            assert!(guard.is_some());
            assert!(observer.is_busy());
            assert!(flag.enter().is_none());
        }
        assert!(!observer.is_busy());
        assert!(flag.enter().is_some());
    }

    #[test]
    fn test_child_follows_parent() {
        let parent = ViewScope::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());

        let parent = ViewScope::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }
}
