//! Core state machine types.
//!
//! This module contains the vocabulary shared by the engine and the
//! schedulers:
//! - State and Event identifiers via the `State` and `Event` traits
//! - Guard and Action capabilities attached to transitions
//! - The error taxonomy
//! - Bounded history of committed transitions

mod error;
mod guard;
mod history;
mod state;

pub use error::{Entity, FsmError};
pub use guard::{Action, ActionError, ActionFn, Always, Guard, GuardFn, NoOp};
pub use history::{StateHistory, TransitionRecord, DEFAULT_HISTORY_LIMIT};
pub use state::{Event, State, StringEvent, StringState};
