//! Error types shared by the engine and the schedulers.

use super::guard::ActionError;
use std::fmt;
use thiserror::Error;

/// Kind of registry entry an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    State,
    Event,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => f.write_str("state"),
            Self::Event => f.write_str("event"),
        }
    }
}

/// Errors returned by engines and schedulers.
///
/// Registry errors (`AlreadyExists`, `NotFound`) are returned during setup.
/// `NoTransition` is an ordinary outcome of dispatch. `Action` carries
/// whatever the selected action returned, untouched. The remaining variants
/// only come from schedulers.
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: Entity, id: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: Entity, id: String },

    #[error("no transition registered for event '{event}' in state '{state}'")]
    NoTransition { state: String, event: String },

    #[error("{0}")]
    Action(ActionError),

    #[error("the current event has been preempted")]
    Preempted,

    #[error("scheduler is closed")]
    Closed,

    #[error("worker exited before completing the submission")]
    Abandoned,

    #[error("worker thread panicked")]
    WorkerPanicked,

    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl FsmError {
    pub(crate) fn state_exists(id: &str) -> Self {
        Self::AlreadyExists {
            kind: Entity::State,
            id: id.to_string(),
        }
    }

    pub(crate) fn event_exists(id: &str) -> Self {
        Self::AlreadyExists {
            kind: Entity::Event,
            id: id.to_string(),
        }
    }

    pub(crate) fn state_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: Entity::State,
            id: id.to_string(),
        }
    }

    pub(crate) fn event_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: Entity::Event,
            id: id.to_string(),
        }
    }

    /// True for the expected "this state does not handle the event" outcome.
    pub fn is_no_transition(&self) -> bool {
        matches!(self, Self::NoTransition { .. })
    }

    /// True when a scheduler discarded the event before running it.
    pub fn is_preempted(&self) -> bool {
        matches!(self, Self::Preempted)
    }

    /// The error returned by the action, if this is an action failure.
    pub fn action_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Action(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            FsmError::state_not_found("on").to_string(),
            "state on not found"
        );
        assert_eq!(
            FsmError::event_not_found("switch").to_string(),
            "event switch not found"
        );
    }

    #[test]
    fn already_exists_names_the_entity() {
        assert_eq!(
            FsmError::state_exists("off").to_string(),
            "state off already exists"
        );
        assert_eq!(
            FsmError::event_exists("switch").to_string(),
            "event switch already exists"
        );
    }

    #[test]
    fn action_error_displays_unchanged() {
        let err = FsmError::Action("disk full".into());
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.action_error().unwrap().to_string(), "disk full");
    }

    #[test]
    fn preempted_message() {
        assert!(FsmError::Preempted.is_preempted());
        assert_eq!(
            FsmError::Preempted.to_string(),
            "the current event has been preempted"
        );
    }

    #[test]
    fn no_transition_message_names_event_and_state() {
        let err = FsmError::NoTransition {
            state: "off".to_string(),
            event: "switch".to_string(),
        };
        assert!(err.is_no_transition());
        assert!(err.to_string().starts_with("no transition registered"));
        assert_eq!(
            err.to_string(),
            "no transition registered for event 'switch' in state 'off'"
        );
    }
}
