//! Messages passed from callers to a scheduler's threads.

use super::completion::{Completion, Reply};
use crate::core::{Event, FsmError, State};
use crate::engine::dispatch::{self, JobScope};
use crate::engine::{Engine, REENTRANT_DISPATCH};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Closure run by the worker against the engine it owns.
pub(crate) type EngineJob<S, E, P> = Box<dyn FnOnce(&mut Engine<S, E, P>) + Send>;

/// An event waiting to be processed, with the handle of whoever waits for it.
pub(crate) struct Submission<E> {
    pub(crate) event: E,
    reply: Reply,
}

impl<E: Event> Submission<E> {
    pub(crate) fn new(event: E) -> (Self, Completion) {
        let (reply, completion) = Completion::channel();
        (Self { event, reply }, completion)
    }

    /// Fulfil the caller's completion. A caller that stopped waiting is ignored.
    pub(crate) fn complete(self, result: Result<(), FsmError>) {
        let _ = self.reply.send(result);
    }

    pub(crate) fn event_id(&self) -> &str {
        self.event.id()
    }
}

pub(crate) enum Command<S: State, E: Event, P> {
    Submit(Submission<E>),
    Configure(EngineJob<S, E, P>),
    Shutdown,
}

/// Wrap `f` as an engine job whose return value is sent back on the receiver.
pub(crate) fn engine_job<S, E, P, R, F>(f: F) -> (EngineJob<S, E, P>, oneshot::Receiver<R>)
where
    S: State,
    E: Event,
    F: FnOnce(&mut Engine<S, E, P>) -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let job: EngineJob<S, E, P> = Box::new(move |engine| {
        let _ = tx.send(f(engine));
    });
    (job, rx)
}

/// Run `job` on the worker, marked so that calls back into the owning
/// scheduler are caught by [`ensure_not_reentrant`].
pub(crate) fn run_job<S: State, E: Event, P>(
    engine: &mut Engine<S, E, P>,
    job: EngineJob<S, E, P>,
) {
    let _scope = JobScope::enter(engine.id());
    job(engine);
}

/// Error for a send that found the worker side gone: `Closed` after
/// `close()`, otherwise the worker died.
pub(crate) fn disconnected(closed: bool) -> FsmError {
    if closed {
        FsmError::Closed
    } else {
        FsmError::Abandoned
    }
}

/// Block until an engine job has run.
pub(crate) fn wait_job<R>(rx: oneshot::Receiver<R>) -> Result<R, FsmError> {
    rx.blocking_recv().map_err(|_| FsmError::Abandoned)
}

/// Panic if the calling thread is inside a guard or action of `engine`.
///
/// Such a call would wait on the very worker that is running it.
pub(crate) fn ensure_not_reentrant(engine: Uuid) {
    if dispatch::is_active(engine) {
        panic!("{}", REENTRANT_DISPATCH);
    }
}
