//! Guards and actions attached to transitions.
//!
//! A guard decides whether a transition is eligible for an event; an action
//! performs the transition's side effects. The state only changes when the
//! action succeeds.

use std::error::Error;

/// Opaque error produced by an action. It reaches the caller unchanged.
pub type ActionError = Box<dyn Error + Send + Sync>;

/// Predicate that determines if a transition can be taken.
///
/// Guards are evaluated in registration order; the first one that returns
/// `true` wins.
///
/// # Example
///
/// ```rust
/// use statelane::core::{Guard, GuardFn, StringEvent};
///
/// let only_small = GuardFn::new(|limit: &u32, _: &StringEvent| *limit < 10);
///
/// assert!(only_small.evaluate(&3, &StringEvent::new("go")));
/// assert!(!only_small.evaluate(&30, &StringEvent::new("go")));
/// ```
pub trait Guard<P, E> {
    fn evaluate(&self, payload: &P, event: &E) -> bool;
}

/// Side effect executed when a transition is taken.
///
/// Returning an error aborts the transition: the engine keeps its current
/// state and hands the error back to the caller. Effects that already
/// happened are not rolled back.
pub trait Action<P, E> {
    fn apply(&mut self, payload: &mut P, event: &E) -> Result<(), ActionError>;
}

/// Guard that always allows the transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Always;

impl<P, E> Guard<P, E> for Always {
    fn evaluate(&self, _payload: &P, _event: &E) -> bool {
        true
    }
}

/// Action that does nothing and never fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoOp;

impl<P, E> Action<P, E> for NoOp {
    fn apply(&mut self, _payload: &mut P, _event: &E) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Guard backed by a closure.
pub struct GuardFn<F> {
    predicate: F,
}

impl<F> GuardFn<F> {
    /// Create a guard from a predicate over the payload and the event.
    pub fn new<P, E>(predicate: F) -> Self
    where
        F: Fn(&P, &E) -> bool,
    {
        Self { predicate }
    }
}

impl<P, E, F> Guard<P, E> for GuardFn<F>
where
    F: Fn(&P, &E) -> bool,
{
    fn evaluate(&self, payload: &P, event: &E) -> bool {
        (self.predicate)(payload, event)
    }
}

/// Action backed by a closure.
///
/// # Example
///
/// ```rust
/// use statelane::core::{Action, ActionFn, StringEvent};
///
/// let mut bump = ActionFn::new(|count: &mut u32, _: &StringEvent| {
///     *count += 1;
///     Ok(())
/// });
///
/// let mut count = 0;
/// bump.apply(&mut count, &StringEvent::new("tick")).unwrap();
/// assert_eq!(count, 1);
/// ```
pub struct ActionFn<F> {
    effect: F,
}

impl<F> ActionFn<F> {
    /// Create an action from a closure over the payload and the event.
    pub fn new<P, E>(effect: F) -> Self
    where
        F: FnMut(&mut P, &E) -> Result<(), ActionError>,
    {
        Self { effect }
    }
}

impl<P, E, F> Action<P, E> for ActionFn<F>
where
    F: FnMut(&mut P, &E) -> Result<(), ActionError>,
{
    fn apply(&mut self, payload: &mut P, event: &E) -> Result<(), ActionError> {
        (self.effect)(payload, event)
    }
}
