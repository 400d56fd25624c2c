//! State and Event capabilities.
//!
//! Both are identified by a string. Any type exposing an identifier can take
//! part in an engine, so callers are free to define their own enumerations
//! (see [`state_enum!`](crate::state_enum)) or use the string-keyed
//! [`StringState`] and [`StringEvent`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Trait for state machine states.
///
/// The identifier must be unique within one engine. States are immutable
/// values; the same value is typically shared by many engines.
///
/// # Example
///
/// ```rust
/// use statelane::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn id(&self) -> &str {
///         match self {
///             Self::Open => "open",
///             Self::Closed => "closed",
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.id(), "open");
/// ```
pub trait State: Clone + Debug + Send + Sync + 'static {
    /// Identifier of the state, unique within one engine.
    fn id(&self) -> &str;
}

/// Trait for events fed into an engine.
///
/// Unlike states, events may carry data and a fresh value is usually built
/// for every submission.
pub trait Event: Send + 'static {
    /// Identifier of the event kind, unique within one engine.
    fn id(&self) -> &str;
}

/// A state identified only by its string.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringState(String);

impl StringState {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl State for StringState {
    fn id(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StringState {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for StringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event identified only by its string, carrying no data.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringEvent(String);

impl StringEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Event for StringEvent {
    fn id(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StringEvent {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for StringEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
