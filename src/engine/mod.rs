//! The transition-dispatch engine.
//!
//! [`Engine`] is a plain, unsynchronized state machine. Guards are checked
//! in registration order, the first passing transition has its action run,
//! and the new state is committed only if the action succeeds. Dispatch is
//! not reentrant; see [`dispatch`] for how that is enforced at runtime.

pub mod dispatch;
mod machine;
mod transition;

pub use dispatch::REENTRANT_DISPATCH;
pub use machine::Engine;
pub use transition::Transition;
