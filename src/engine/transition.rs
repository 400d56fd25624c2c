//! Transition table entries.

use crate::core::{Action, ActionError, Always, Guard, NoOp, State};

/// A registered transition.
///
/// The source state and event are not stored: they are the key under which
/// the engine files the transition.
pub struct Transition<S: State, P, E> {
    pub(crate) to: S,
    pub(crate) guard: Box<dyn Guard<P, E> + Send>,
    pub(crate) action: Box<dyn Action<P, E> + Send>,
}

impl<S: State, P, E> Transition<S, P, E> {
    pub fn new<A, G>(to: S, action: A, guard: G) -> Self
    where
        A: Action<P, E> + Send + 'static,
        G: Guard<P, E> + Send + 'static,
    {
        Self {
            to,
            guard: Box::new(guard),
            action: Box::new(action),
        }
    }

    /// Unconditional transition without side effects.
    pub fn plain(to: S) -> Self {
        Self::new(to, NoOp, Always)
    }

    pub fn target(&self) -> &S {
        &self.to
    }

    pub(crate) fn allows(&self, payload: &P, event: &E) -> bool {
        self.guard.evaluate(payload, event)
    }

    pub(crate) fn run(&mut self, payload: &mut P, event: &E) -> Result<(), ActionError> {
        self.action.apply(payload, event)
    }
}
