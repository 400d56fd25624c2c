//! Builder API for ergonomic engine construction.
//!
//! This module provides fluent builders and macros for declaring states,
//! events and transitions with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::EngineBuilder;
pub use transition::{TransitionBuilder, TransitionDef};

use crate::core::State;

/// Create an unconditional transition without side effects.
///
/// # Example
///
/// ```
/// use statelane::builder::{simple_transition, EngineBuilder};
/// use statelane::core::{StringEvent, StringState};
///
/// let engine = EngineBuilder::<_, StringEvent, _>::new(StringState::new("red"), ())
///     .state(StringState::new("green"))
///     .event("next")
///     .transition(simple_transition(StringState::new("red"), "next", StringState::new("green")))
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.transition_count(&StringState::new("red"), "next"), 1);
/// ```
pub fn simple_transition<S, P, E>(from: S, event_id: &str, to: S) -> TransitionBuilder<S, P, E>
where
    S: State,
{
    TransitionBuilder::new().from(from).on(event_id).to(to)
}

/// Create a transition taken only when `guard` accepts the payload and event.
pub fn guarded_transition<S, P, E, F>(
    from: S,
    event_id: &str,
    to: S,
    guard: F,
) -> TransitionBuilder<S, P, E>
where
    S: State,
    F: Fn(&P, &E) -> bool + Send + 'static,
{
    simple_transition(from, event_id, to).when(guard)
}
