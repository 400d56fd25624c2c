//! Transition-dispatch engine.

use super::dispatch::DispatchDepth;
use super::transition::Transition;
use crate::core::{
    Action, Event, FsmError, Guard, State, StateHistory, TransitionRecord,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};
use uuid::Uuid;

type TransitionTable<S, P, E> = HashMap<String, HashMap<String, Vec<Transition<S, P, E>>>>;

/// Finite state machine holding a current state, the registries of valid
/// states and events, and an ordered transition table.
///
/// The engine is not synchronized. Exclusive access is expressed through
/// `&mut self`; to drive one engine from several threads hand it to a
/// [`SerializedScheduler`](crate::scheduler::SerializedScheduler) or a
/// [`PreemptiveScheduler`](crate::scheduler::PreemptiveScheduler).
///
/// # Example
///
/// ```rust
/// use statelane::core::{Always, NoOp, StringEvent, StringState};
/// use statelane::engine::Engine;
///
/// let off = StringState::new("off");
/// let on = StringState::new("on");
///
/// let mut engine: Engine<StringState, StringEvent, ()> = Engine::new(off.clone(), ());
/// engine.add_state(on.clone()).unwrap();
/// engine.add_event("switch").unwrap();
/// engine.add_transition(&off, "switch", &on, NoOp, Always).unwrap();
///
/// engine.process_event(&StringEvent::new("switch")).unwrap();
/// assert_eq!(engine.current_state(), &on);
/// ```
pub struct Engine<S: State, E: Event, P> {
    id: Uuid,
    current: S,
    states: HashMap<String, S>,
    events: HashSet<String>,
    transitions: TransitionTable<S, P, E>,
    payload: P,
    history: StateHistory,
}

impl<S: State, E: Event, P> Engine<S, E, P> {
    /// Create an engine in `initial`, which is registered as a state.
    /// `payload` is handed to every guard and action.
    pub fn new(initial: S, payload: P) -> Self {
        Self::with_history(initial, payload, StateHistory::new())
    }

    pub(crate) fn with_history(initial: S, payload: P, history: StateHistory) -> Self {
        let mut states = HashMap::new();
        states.insert(initial.id().to_string(), initial.clone());
        Self {
            id: Uuid::new_v4(),
            current: initial,
            states,
            events: HashSet::new(),
            transitions: HashMap::new(),
            payload,
            history,
        }
    }

    /// Unique id of this engine instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn add_state(&mut self, state: S) -> Result<(), FsmError> {
        if self.has_state(&state) {
            return Err(FsmError::state_exists(state.id()));
        }
        self.states.insert(state.id().to_string(), state);
        Ok(())
    }

    pub fn add_event(&mut self, event_id: &str) -> Result<(), FsmError> {
        if self.has_event(event_id) {
            return Err(FsmError::event_exists(event_id));
        }
        self.events.insert(event_id.to_string());
        Ok(())
    }

    /// Append a transition for `(from, event_id)`.
    ///
    /// `from`, `event_id` and `to` must already be registered. Transitions
    /// for the same pair are tried in the order they were added: the first
    /// one whose guard passes has its action run.
    pub fn add_transition<A, G>(
        &mut self,
        from: &S,
        event_id: &str,
        to: &S,
        action: A,
        guard: G,
    ) -> Result<(), FsmError>
    where
        A: Action<P, E> + Send + 'static,
        G: Guard<P, E> + Send + 'static,
    {
        self.push_transition(from, event_id, Transition::new(to.clone(), action, guard))
    }

    pub(crate) fn push_transition(
        &mut self,
        from: &S,
        event_id: &str,
        transition: Transition<S, P, E>,
    ) -> Result<(), FsmError> {
        if !self.has_state(from) {
            return Err(FsmError::state_not_found(from.id()));
        }
        if !self.has_event(event_id) {
            return Err(FsmError::event_not_found(event_id));
        }
        if !self.has_state(transition.target()) {
            return Err(FsmError::state_not_found(transition.target().id()));
        }
        self.transitions
            .entry(from.id().to_string())
            .or_default()
            .entry(event_id.to_string())
            .or_default()
            .push(transition);
        Ok(())
    }

    /// Dispatch `event` from the current state.
    ///
    /// Returns `NoTransition` when the current state has no transition for
    /// the event or every guard rejects it. When the selected action fails
    /// its error is returned as `FsmError::Action` and the state is left
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics when called from a guard or action of a dispatch already in
    /// progress on this engine.
    pub fn process_event(&mut self, event: &E) -> Result<(), FsmError> {
        let _depth = DispatchDepth::enter(self.id);

        let candidates = self
            .transitions
            .get_mut(self.current.id())
            .and_then(|by_event| by_event.get_mut(event.id()));

        if let Some(candidates) = candidates {
            for transition in candidates.iter_mut() {
                if !transition.allows(&self.payload, event) {
                    trace!(
                        engine = %self.id,
                        state = self.current.id(),
                        event = event.id(),
                        to = transition.target().id(),
                        "guard rejected transition"
                    );
                    continue;
                }

                if let Err(err) = transition.run(&mut self.payload, event) {
                    debug!(
                        engine = %self.id,
                        state = self.current.id(),
                        event = event.id(),
                        error = %err,
                        "action failed, state unchanged"
                    );
                    return Err(FsmError::Action(err));
                }

                let to = transition.target().clone();
                self.history
                    .record(TransitionRecord::now(self.current.id(), event.id(), to.id()));
                debug!(
                    engine = %self.id,
                    from = self.current.id(),
                    event = event.id(),
                    to = to.id(),
                    "transition committed"
                );
                self.current = to;
                return Ok(());
            }
        }

        debug!(
            engine = %self.id,
            state = self.current.id(),
            event = event.id(),
            "no transition"
        );
        Err(FsmError::NoTransition {
            state: self.current.id().to_string(),
            event: event.id().to_string(),
        })
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    pub fn has_state(&self, state: &S) -> bool {
        self.states.contains_key(state.id())
    }

    pub fn has_event(&self, event_id: &str) -> bool {
        self.events.contains(event_id)
    }

    /// Number of transitions registered for `(from, event_id)`.
    pub fn transition_count(&self, from: &S, event_id: &str) -> usize {
        self.transitions
            .get(from.id())
            .and_then(|by_event| by_event.get(event_id))
            .map_or(0, Vec::len)
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }
}
