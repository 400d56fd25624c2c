//! Single-owner schedulers.
//!
//! A scheduler takes ownership of an [`Engine`] and moves it onto a
//! dedicated worker thread. From then on the engine is only touched by that
//! worker; callers interact with it through the [`Scheduler`] trait, which
//! any number of threads may share.
//!
//! Two policies are provided:
//!
//! - [`SerializedScheduler`] processes every submission, strictly in order.
//! - [`PreemptiveScheduler`] keeps only the latest waiting submission and
//!   fails the ones it displaces with [`FsmError::Preempted`].

mod command;
mod completion;
mod config;
mod preemptive;
mod serialized;

pub use completion::Completion;
pub use config::{SchedulerConfig, SchedulerConfigBuilder, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_NAME};
pub use preemptive::PreemptiveScheduler;
pub use serialized::SerializedScheduler;

use crate::core::{Action, Event, FsmError, Guard, State, StateHistory};
use crate::engine::Engine;

/// Thread-safe front of an engine owned by a worker thread.
///
/// Every method may be called from any thread. Calling one from inside a
/// guard or action of the scheduler's own engine panics, since the call
/// would wait on the worker that is running it.
pub trait Scheduler {
    type State: State;
    type Event: Event;
    type Payload: Send + 'static;

    /// Enqueue `event` without waiting for it to be processed.
    fn dispatch(&self, event: Self::Event) -> Result<Completion, FsmError>;

    /// Run `f` on the worker with exclusive access to the engine and return
    /// its result. Blocks until the worker has run it.
    fn with_engine<R, F>(&self, f: F) -> Result<R, FsmError>
    where
        F: FnOnce(&mut Engine<Self::State, Self::Event, Self::Payload>) -> R + Send + 'static,
        R: Send + 'static;

    /// Stop the scheduler's threads and wait for them to exit.
    ///
    /// Idempotent. Afterwards every other method fails with
    /// [`FsmError::Closed`].
    fn close(&self) -> Result<(), FsmError>;

    /// Enqueue `event` and block until its outcome is known.
    fn submit(&self, event: Self::Event) -> Result<(), FsmError> {
        self.dispatch(event)?.wait()
    }

    fn add_state(&self, state: Self::State) -> Result<(), FsmError> {
        self.with_engine(move |engine| engine.add_state(state))?
    }

    fn add_event(&self, event_id: &str) -> Result<(), FsmError> {
        let event_id = event_id.to_string();
        self.with_engine(move |engine| engine.add_event(&event_id))?
    }

    /// See [`Engine::add_transition`].
    fn add_transition<A, G>(
        &self,
        from: &Self::State,
        event_id: &str,
        to: &Self::State,
        action: A,
        guard: G,
    ) -> Result<(), FsmError>
    where
        A: Action<Self::Payload, Self::Event> + Send + 'static,
        G: Guard<Self::Payload, Self::Event> + Send + 'static,
    {
        let (from, to) = (from.clone(), to.clone());
        let event_id = event_id.to_string();
        self.with_engine(move |engine| engine.add_transition(&from, &event_id, &to, action, guard))?
    }

    fn current_state(&self) -> Result<Self::State, FsmError> {
        self.with_engine(|engine| engine.current_state().clone())
    }

    fn has_state(&self, state: &Self::State) -> Result<bool, FsmError> {
        let state = state.clone();
        self.with_engine(move |engine| engine.has_state(&state))
    }

    fn has_event(&self, event_id: &str) -> Result<bool, FsmError> {
        let event_id = event_id.to_string();
        self.with_engine(move |engine| engine.has_event(&event_id))
    }

    /// Snapshot of the engine's transition history.
    fn history(&self) -> Result<StateHistory, FsmError> {
        self.with_engine(|engine| engine.history().clone())
    }
}
