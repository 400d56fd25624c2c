//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Action, ActionError, ActionFn, Always, Guard, GuardFn, NoOp, State};
use crate::engine::Transition;

/// A transition together with the `(from, event)` pair it is filed under.
pub struct TransitionDef<S: State, P, E> {
    pub from: S,
    pub event: String,
    pub transition: Transition<S, P, E>,
}

/// Builder for constructing transitions with a fluent API.
///
/// Guard and action are optional and default to [`Always`] and [`NoOp`].
pub struct TransitionBuilder<S: State, P, E> {
    from: Option<S>,
    event: Option<String>,
    to: Option<S>,
    guard: Option<Box<dyn Guard<P, E> + Send>>,
    action: Option<Box<dyn Action<P, E> + Send>>,
}

impl<S: State, P, E> TransitionBuilder<S, P, E> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
            action: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the triggering event id (required).
    pub fn on(mut self, event_id: impl Into<String>) -> Self {
        self.event = Some(event_id.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard (optional).
    pub fn guard<G>(mut self, guard: G) -> Self
    where
        G: Guard<P, E> + Send + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&P, &E) -> bool + Send + 'static,
    {
        self.guard(GuardFn::new(predicate))
    }

    /// Set the action (optional).
    pub fn action<A>(mut self, action: A) -> Self
    where
        A: Action<P, E> + Send + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Set the action using a closure (optional).
    pub fn then<F>(self, effect: F) -> Self
    where
        F: FnMut(&mut P, &E) -> Result<(), ActionError> + Send + 'static,
    {
        self.action(ActionFn::new(effect))
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionDef<S, P, E>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let event = self.event.ok_or(BuildError::MissingEvent)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        let guard: Box<dyn Guard<P, E> + Send> = match self.guard {
            Some(guard) => guard,
            None => Box::new(Always),
        };
        let action: Box<dyn Action<P, E> + Send> = match self.action {
            Some(action) => action,
            None => Box::new(NoOp),
        };

        Ok(TransitionDef {
            from,
            event,
            transition: Transition {
                to,
                guard,
                action,
            },
        })
    }
}

impl<S: State, P, E> Default for TransitionBuilder<S, P, E> {
    fn default() -> Self {
        Self::new()
    }
}
