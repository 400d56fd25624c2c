//! Per-thread dispatch depth.
//!
//! Every engine pushes its id onto a thread-local stack for the duration of
//! `process_event`. An engine whose id is already on the stack is being
//! re-entered from one of its own guards or actions, which is a contract
//! violation and aborts the dispatch with a panic.
//!
//! Jobs a scheduler runs against its engine outside of dispatch are marked
//! with a separate [`JobScope`]. They may call `process_event` directly, but
//! they count as active for [`is_active`], so calling back into the owning
//! scheduler panics there too.

use std::cell::RefCell;
use uuid::Uuid;

/// Panic message for a reentrant dispatch.
pub const REENTRANT_DISPATCH: &str =
    "process_event must not be re-entered: do not dispatch into the same engine from a guard or action";

thread_local! {
    static ACTIVE: RefCell<Vec<Uuid>> = const { RefCell::new(Vec::new()) };
    static JOBS: RefCell<Vec<Uuid>> = const { RefCell::new(Vec::new()) };
}

fn remove_last(stack: &RefCell<Vec<Uuid>>, engine: Uuid) {
    let mut stack = stack.borrow_mut();
    if let Some(pos) = stack.iter().rposition(|id| *id == engine) {
        stack.remove(pos);
    }
}

/// Marks an engine as dispatching on the current thread until dropped.
pub(crate) struct DispatchDepth {
    engine: Uuid,
}

impl DispatchDepth {
    /// Increment the depth for `engine`, panicking unless it is now exactly 1.
    pub(crate) fn enter(engine: Uuid) -> Self {
        let depth = ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            active.push(engine);
            active.iter().filter(|id| **id == engine).count()
        });
        // constructed before the check so unwinding still pops the entry
        let guard = Self { engine };
        if depth != 1 {
            panic!("{}", REENTRANT_DISPATCH);
        }
        guard
    }
}

impl Drop for DispatchDepth {
    fn drop(&mut self) {
        ACTIVE.with(|active| remove_last(active, self.engine));
    }
}

/// Marks the current thread as running a scheduler job against `engine`
/// until dropped.
pub(crate) struct JobScope {
    engine: Uuid,
}

impl JobScope {
    pub(crate) fn enter(engine: Uuid) -> Self {
        JOBS.with(|jobs| jobs.borrow_mut().push(engine));
        Self { engine }
    }
}

impl Drop for JobScope {
    fn drop(&mut self) {
        JOBS.with(|jobs| remove_last(jobs, self.engine));
    }
}

/// Number of in-flight dispatches of `engine` on the current thread.
pub fn depth(engine: Uuid) -> usize {
    ACTIVE.with(|active| active.borrow().iter().filter(|id| **id == engine).count())
}

/// True while the current thread is inside a guard or action of `engine`,
/// or inside a scheduler job running against it.
pub fn is_active(engine: Uuid) -> bool {
    depth(engine) > 0 || JOBS.with(|jobs| jobs.borrow().contains(&engine))
}
