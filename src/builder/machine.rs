//! Builder for constructing engines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Event, State, StateHistory, DEFAULT_HISTORY_LIMIT};
use crate::engine::Engine;

enum Step<S: State, P, E> {
    State(S),
    Event(String),
    Transition(TransitionBuilder<S, P, E>),
}

/// Builder for constructing engines with a fluent API.
///
/// Registrations are replayed in call order by [`build`](Self::build), so a
/// transition must come after the states and event it refers to.
///
/// # Example
///
/// ```rust
/// use statelane::builder::{EngineBuilder, TransitionBuilder};
/// use statelane::core::{StringEvent, StringState};
///
/// let off = StringState::new("off");
/// let on = StringState::new("on");
///
/// let engine = EngineBuilder::<_, StringEvent, _>::new(off.clone(), 0u32)
///     .state(on.clone())
///     .event("switch")
///     .transition(TransitionBuilder::new().from(off.clone()).on("switch").to(on.clone()))
///     .transition(TransitionBuilder::new().from(on).on("switch").to(off))
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.current_state().to_string(), "off");
/// ```
pub struct EngineBuilder<S: State, E: Event, P> {
    initial: S,
    payload: P,
    steps: Vec<Step<S, P, E>>,
    history_limit: usize,
}

impl<S: State, E: Event, P> EngineBuilder<S, E, P> {
    /// Create a builder for an engine starting in `initial`.
    pub fn new(initial: S, payload: P) -> Self {
        Self {
            initial,
            payload,
            steps: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Register a state.
    pub fn state(mut self, state: S) -> Self {
        self.steps.push(Step::State(state));
        self
    }

    /// Register several states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.steps.extend(states.into_iter().map(Step::State));
        self
    }

    /// Register an event id.
    pub fn event(mut self, event_id: impl Into<String>) -> Self {
        self.steps.push(Step::Event(event_id.into()));
        self
    }

    /// Register several event ids at once.
    pub fn events<I>(mut self, event_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.steps
            .extend(event_ids.into_iter().map(|id| Step::Event(id.into())));
        self
    }

    /// Add a transition using a builder.
    pub fn transition(mut self, builder: TransitionBuilder<S, P, E>) -> Self {
        self.steps.push(Step::Transition(builder));
        self
    }

    /// Number of committed transitions the engine remembers.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the engine.
    /// Returns the first registration or validation error encountered.
    pub fn build(self) -> Result<Engine<S, E, P>, BuildError> {
        let history = StateHistory::with_limit(self.history_limit);
        let mut engine = Engine::with_history(self.initial, self.payload, history);

        for step in self.steps {
            match step {
                Step::State(state) => engine.add_state(state)?,
                Step::Event(event_id) => engine.add_event(&event_id)?,
                Step::Transition(builder) => {
                    let def = builder.build()?;
                    engine.push_transition(&def.from, &def.event, def.transition)?;
                }
            }
        }

        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Entity, FsmError, StringEvent, StringState};

    type Builder = EngineBuilder<StringState, StringEvent, u32>;

    fn off() -> StringState {
        StringState::new("off")
    }

    fn on() -> StringState {
        StringState::new("on")
    }

    #[test]
    fn builder_registers_everything_in_order() {
        let mut engine = Builder::new(off(), 0)
            .state(on())
            .event("switch")
            .transition(
                TransitionBuilder::new()
                    .from(off())
                    .on("switch")
                    .to(on())
                    .then(|count: &mut u32, _: &StringEvent| {
                        *count += 1;
                        Ok(())
                    }),
            )
            .build()
            .unwrap();

        assert!(engine.has_state(&on()));
        assert!(engine.has_event("switch"));
        engine.process_event(&StringEvent::new("switch")).unwrap();
        assert_eq!(engine.current_state(), &on());
        assert_eq!(*engine.payload(), 1);
    }

    #[test]
    fn builder_reports_duplicate_state() {
        let result = Builder::new(off(), 0).states([on(), on()]).build();
        assert!(matches!(
            result,
            Err(BuildError::Engine(FsmError::AlreadyExists {
                kind: Entity::State,
                ..
            }))
        ));
    }

    #[test]
    fn transition_before_its_event_fails() {
        let result = Builder::new(off(), 0)
            .state(on())
            .transition(TransitionBuilder::new().from(off()).on("switch").to(on()))
            .event("switch")
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Engine(FsmError::NotFound {
                kind: Entity::Event,
                ..
            }))
        ));
    }

    #[test]
    fn incomplete_transition_fails() {
        let result = Builder::new(off(), 0)
            .state(on())
            .event("switch")
            .transition(TransitionBuilder::new().from(off()).on("switch"))
            .build();

        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn events_registers_each_id() {
        let engine = Builder::new(off(), 0)
            .events(["start", "stop"])
            .build()
            .unwrap();
        assert!(engine.has_event("start"));
        assert!(engine.has_event("stop"));
    }

    #[test]
    fn history_limit_is_applied() {
        let engine = Builder::new(off(), 0).history_limit(3).build().unwrap();
        assert_eq!(engine.history().limit(), 3);
    }
}
