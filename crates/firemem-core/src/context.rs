//! Per-call execution context for memory operations.
//!
//! Every [`Memory`](crate::memory::store::Memory) operation receives a
//! `CallContext` instead of relying on a context captured when the store was
//! built. The context carries a cancellation token and an optional deadline;
//! [`CallContext::run`] races an operation against both.

use std::future::Future;
use std::time::Duration;

use firemem_types::error::MemoryError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline for a single memory call.
///
/// Cloning shares the same token. [`CallContext::child`] derives a token that
/// is cancelled with its parent but can also be cancelled on its own.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context bound to an existing cancellation token (e.g. the bot's
    /// shutdown token).
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Derive a child context with the same deadline and a child token.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Drive `op` to completion unless the context is cancelled or its
    /// deadline passes first.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Cancelled`] if the token fires (including before
    /// the call starts), [`MemoryError::DeadlineExceeded`] if the deadline
    /// passes, and otherwise whatever `op` returns.
    pub async fn run<F, T>(&self, op: F) -> Result<T, MemoryError>
    where
        F: Future<Output = Result<T, MemoryError>>,
    {
        if self.is_cancelled() {
            return Err(MemoryError::Cancelled);
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => Err(MemoryError::Cancelled),
                result = op => result,
            }
        };

        match self.deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, guarded).await {
                Ok(result) => result,
                Err(_) => Err(MemoryError::DeadlineExceeded),
            },
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = CallContext::new();
        let value = ctx.run(async { Ok::<_, MemoryError>(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = ctx
            .run(async { Err::<(), _>(MemoryError::Closed) })
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::Closed));
    }

    #[tokio::test]
    async fn test_run_on_cancelled_context_fails_fast() {
        let ctx = CallContext::new();
        ctx.cancel();
        let err = ctx.run(async { Ok::<_, MemoryError>(()) }).await.unwrap_err();
        assert!(matches!(err, MemoryError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = ctx
            .run(std::future::pending::<Result<(), MemoryError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(1));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, MemoryError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::DeadlineExceeded));
    }

    #[test]
    fn test_child_is_cancelled_with_parent() {
        let parent = CallContext::new().with_timeout(Duration::from_secs(3));
        let child = parent.child();
        assert_eq!(child.deadline(), parent.deadline());

        child.cancel();
        assert!(!parent.is_cancelled());

        let second = parent.child();
        parent.cancel();
        assert!(second.is_cancelled());
    }
}
