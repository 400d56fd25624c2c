//! One-shot result handle for a submitted event.

use crate::core::FsmError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

pub(crate) type Reply = oneshot::Sender<Result<(), FsmError>>;

/// Pending outcome of a dispatched event.
///
/// The scheduler fulfils it exactly once: with the engine's result, or with
/// `Preempted` if a newer submission displaced it. If the scheduler's worker
/// goes away first it resolves to `Abandoned`.
///
/// Block on it with [`wait`](Self::wait) or `.await` it from async code.
#[must_use = "a completion does nothing unless waited on or awaited"]
pub struct Completion {
    rx: oneshot::Receiver<Result<(), FsmError>>,
}

impl Completion {
    pub(crate) fn channel() -> (Reply, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Block the current thread until the result is available.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; use
    /// `.await` there instead.
    pub fn wait(self) -> Result<(), FsmError> {
        self.rx
            .blocking_recv()
            .unwrap_or_else(|_| Err(FsmError::Abandoned))
    }
}

impl Future for Completion {
    type Output = Result<(), FsmError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(FsmError::Abandoned)))
    }
}
