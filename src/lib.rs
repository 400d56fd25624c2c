//! Statelane: a finite state machine engine with single-owner schedulers
//!
//! An [`Engine`](engine::Engine) holds a current state, registries of valid
//! states and events, and an ordered list of guarded transitions per
//! `(state, event)` pair. Dispatching an event runs the first transition
//! whose guard passes; the state only moves when its action succeeds.
//!
//! The engine itself is not synchronized. To share one between threads, hand
//! it to a scheduler, which moves it onto a worker thread:
//!
//! - [`SerializedScheduler`](scheduler::SerializedScheduler) runs every
//!   submitted event in FIFO order.
//! - [`PreemptiveScheduler`](scheduler::PreemptiveScheduler) keeps only the
//!   newest waiting event; older waiting events fail with
//!   [`FsmError::Preempted`](core::FsmError::Preempted).
//!
//! # Core Concepts
//!
//! - **State / Event**: anything exposing a string id via the `State` and
//!   `Event` traits
//! - **Guards**: predicates over the payload and event that select a transition
//! - **Actions**: fallible side effects; an error aborts the transition
//! - **History**: bounded record of committed transitions
//!
//! # Example
//!
//! ```rust
//! use statelane::builder::{simple_transition, EngineBuilder};
//! use statelane::core::{StringEvent, StringState};
//! use statelane::scheduler::{Scheduler, SerializedScheduler};
//!
//! let (idle, busy) = (StringState::new("idle"), StringState::new("busy"));
//!
//! let engine = EngineBuilder::<_, StringEvent, _>::new(idle.clone(), ())
//!     .state(busy.clone())
//!     .events(["start", "finish"])
//!     .transition(simple_transition(idle.clone(), "start", busy.clone()))
//!     .transition(simple_transition(busy.clone(), "finish", idle.clone()))
//!     .build()
//!     .unwrap();
//!
//! let fsm = SerializedScheduler::new(engine).unwrap();
//! fsm.submit(StringEvent::new("start")).unwrap();
//! assert_eq!(fsm.current_state().unwrap(), busy);
//!
//! fsm.submit(StringEvent::new("finish")).unwrap();
//! assert_eq!(fsm.history().unwrap().get_path(), vec!["idle", "busy", "idle"]);
//! fsm.close().unwrap();
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod scheduler;

pub use crate::core::{Event, FsmError, State};
pub use crate::engine::Engine;
pub use crate::scheduler::{Completion, PreemptiveScheduler, Scheduler, SerializedScheduler};
