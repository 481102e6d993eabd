//! Per-request cancellation and deadline.
//!
//! Every cache read, store query and cache write runs through
//! [`RequestContext::run`], which races the I/O future against the caller's
//! deadline and cancellation signal. Aborts propagate as
//! [`Error::Cancelled`] / [`Error::DeadlineExceeded`]; nothing is retried.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Caller context carried into every I/O call.
///
/// Cheap to clone. A default context never expires and cannot be cancelled.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Trips the cancellation signal of the contexts derived from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every in-flight and future operation of the paired context.
    pub fn cancel(&self) {
        // Receivers may all be gone already
        let _ = self.tx.send(true);
    }
}

impl RequestContext {
    /// Context with no deadline and no cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_at(Instant::now() + timeout)
    }

    /// Set (or tighten) the deadline.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Attach a cancellation signal, returning the handle that trips it.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the cancellation signal has been tripped.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run `fut` unless the context is cancelled or its deadline passes first.
    ///
    /// `op` names the operation in the resulting error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` or `Error::DeadlineExceeded` when the
    /// context aborts, otherwise whatever `fut` yields.
    pub async fn run<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(Error::Cancelled(op.to_string()));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::DeadlineExceeded(op.to_string()));
        }

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // Handle dropped without cancelling: never fires
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = fut => result,
            _ = cancelled => {
                debug!("» {} cancelled by caller", op);
                Err(Error::Cancelled(op.to_string()))
            }
            _ = expired => {
                debug!("» {} hit the request deadline", op);
                Err(Error::DeadlineExceeded(op.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = RequestContext::background();
        let value = ctx.run("noop", async { Ok(7) }).await.expect("run failed");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let ctx = RequestContext::background();
        let err = ctx
            .run::<(), _>("store query", async { Err(Error::Store("boom".into())) })
            .await
            .unwrap_err();
        assert_eq!(err, Error::Store("boom".into()));
    }

    #[tokio::test]
    async fn test_deadline_aborts_slow_operation() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(20));
        let err = ctx
            .run("cache get", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, Error::DeadlineExceeded("cache get".into()));
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let (ctx, handle) = RequestContext::background().with_cancel();
        handle.cancel();
        assert!(ctx.is_cancelled());

        let err = ctx.run("cache set", async { Ok(()) }).await.unwrap_err();
        assert_eq!(err, Error::Cancelled("cache set".into()));
    }

    #[tokio::test]
    async fn test_cancel_while_in_flight() {
        let (ctx, handle) = RequestContext::background().with_cancel();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let err = ctx
            .run("store query", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(err.is_context_abort());
        canceller.await.expect("canceller panicked");
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let (ctx, handle) = RequestContext::background().with_cancel();
        drop(handle);

        let value = ctx
            .run("noop", async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok("done")
            })
            .await
            .expect("run failed");
        assert_eq!(value, "done");
    }

    #[test]
    fn test_deadline_only_tightens() {
        let now = Instant::now();
        let ctx = RequestContext::background()
            .deadline_at(now + Duration::from_secs(1))
            .deadline_at(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
