//! Build errors for engine and transition builders.

use crate::core::FsmError;
use thiserror::Error;

/// Errors that can occur when building engines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition event not specified. Call .on(event_id)")]
    MissingEvent,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error(transparent)]
    Engine(#[from] FsmError),
}
