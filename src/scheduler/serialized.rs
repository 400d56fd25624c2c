//! Strict FIFO scheduler.

use super::command::{
    disconnected, engine_job, ensure_not_reentrant, run_job, wait_job, Command, Submission,
};
use super::completion::Completion;
use super::config::SchedulerConfig;
use super::Scheduler;
use crate::core::{Event, FsmError, State};
use crate::engine::Engine;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Drives an engine from one dedicated worker thread, one event at a time,
/// in exactly the order events were submitted.
///
/// Every submission runs to completion before the next one starts. Registry
/// calls made through the [`Scheduler`] trait travel through the same queue,
/// so they are ordered with respect to submissions as well.
///
/// # Example
///
/// ```rust
/// use statelane::core::{Always, NoOp, StringEvent, StringState};
/// use statelane::engine::Engine;
/// use statelane::scheduler::{Scheduler, SerializedScheduler};
///
/// let (off, on) = (StringState::new("off"), StringState::new("on"));
/// let engine: Engine<StringState, StringEvent, ()> = Engine::new(off.clone(), ());
/// let fsm = SerializedScheduler::new(engine).unwrap();
///
/// fsm.add_state(on.clone()).unwrap();
/// fsm.add_event("switch").unwrap();
/// fsm.add_transition(&off, "switch", &on, NoOp, Always).unwrap();
///
/// fsm.submit(StringEvent::new("switch")).unwrap();
/// assert_eq!(fsm.current_state().unwrap(), on);
/// fsm.close().unwrap();
/// ```
pub struct SerializedScheduler<S: State, E: Event, P: Send + 'static> {
    engine_id: Uuid,
    tx: Sender<Command<S, E, P>>,
    closed: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: State, E: Event, P: Send + 'static> SerializedScheduler<S, E, P> {
    /// Take ownership of `engine` and start its worker with default settings.
    pub fn new(engine: Engine<S, E, P>) -> Result<Self, FsmError> {
        Self::with_config(engine, SchedulerConfig::default())
    }

    /// Take ownership of `engine` and start its worker.
    pub fn with_config(engine: Engine<S, E, P>, config: SchedulerConfig) -> Result<Self, FsmError> {
        let engine_id = engine.id();
        let (tx, rx) = bounded(config.queue_capacity);

        let worker = thread::Builder::new()
            .name(config.worker_thread_name())
            .spawn(move || run_worker(engine, rx))?;

        Ok(Self {
            engine_id,
            tx,
            closed: AtomicBool::new(false),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Id of the engine this scheduler owns.
    pub fn engine_id(&self) -> Uuid {
        self.engine_id
    }

    fn send(&self, command: Command<S, E, P>) -> Result<(), FsmError> {
        ensure_not_reentrant(self.engine_id);
        if self.closed.load(Ordering::Acquire) {
            return Err(FsmError::Closed);
        }
        self.tx
            .send(command)
            .map_err(|_| disconnected(self.closed.load(Ordering::Acquire)))
    }
}

fn run_worker<S: State, E: Event, P>(mut engine: Engine<S, E, P>, rx: Receiver<Command<S, E, P>>) {
    let engine_id = engine.id();
    info!(engine = %engine_id, "serialized worker started");

    while let Ok(command) = rx.recv() {
        match command {
            Command::Submit(submission) => {
                debug!(engine = %engine_id, event = submission.event_id(), "processing event");
                let result = engine.process_event(&submission.event);
                submission.complete(result);
            }
            Command::Configure(job) => run_job(&mut engine, job),
            Command::Shutdown => break,
        }
    }

    info!(engine = %engine_id, "serialized worker stopped");
}

impl<S: State, E: Event, P: Send + 'static> Scheduler for SerializedScheduler<S, E, P> {
    type State = S;
    type Event = E;
    type Payload = P;

    fn dispatch(&self, event: E) -> Result<Completion, FsmError> {
        let (submission, completion) = Submission::new(event);
        self.send(Command::Submit(submission))?;
        Ok(completion)
    }

    fn with_engine<R, F>(&self, f: F) -> Result<R, FsmError>
    where
        F: FnOnce(&mut Engine<S, E, P>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (job, rx) = engine_job(f);
        self.send(Command::Configure(job))?;
        wait_job(rx)
    }

    fn close(&self) -> Result<(), FsmError> {
        ensure_not_reentrant(self.engine_id);
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return Ok(());
        };

        self.closed.store(true, Ordering::Release);
        // a dead worker has already dropped the receiver
        let _ = self.tx.send(Command::Shutdown);

        handle.join().map_err(|_| {
            warn!(engine = %self.engine_id, "serialized worker panicked");
            FsmError::WorkerPanicked
        })
    }
}

impl<S: State, E: Event, P: Send + 'static> Drop for SerializedScheduler<S, E, P> {
    fn drop(&mut self) {
        // dropped from inside one of its own actions or jobs: the worker cannot join itself
        if crate::engine::dispatch::is_active(self.engine_id) {
            return;
        }
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionFn, Always, NoOp, StringEvent, StringState};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    fn off() -> StringState {
        StringState::new("off")
    }

    fn on() -> StringState {
        StringState::new("on")
    }

    fn switch() -> StringEvent {
        StringEvent::new("switch")
    }

    fn toggling_scheduler() -> SerializedScheduler<StringState, StringEvent, u32> {
        let fsm = SerializedScheduler::new(Engine::new(off(), 0)).unwrap();
        fsm.add_state(on()).unwrap();
        fsm.add_event("switch").unwrap();
        for (from, to) in [(off(), on()), (on(), off())] {
            fsm.add_transition(
                &from,
                "switch",
                &to,
                ActionFn::new(|count: &mut u32, _: &StringEvent| {
                    *count += 1;
                    Ok(())
                }),
                Always,
            )
            .unwrap();
        }
        fsm
    }

    #[test]
    fn registry_calls_reach_the_engine() {
        let fsm = toggling_scheduler();
        assert!(fsm.has_state(&on()).unwrap());
        assert!(fsm.has_event("switch").unwrap());
        assert!(matches!(
            fsm.add_state(on()),
            Err(FsmError::AlreadyExists { .. })
        ));
        fsm.close().unwrap();
    }

    #[test]
    fn submissions_run_in_order() {
        let fsm = toggling_scheduler();
        for _ in 0..3 {
            fsm.submit(switch()).unwrap();
        }
        assert_eq!(fsm.current_state().unwrap(), on());
        assert_eq!(fsm.with_engine(|engine| *engine.payload()).unwrap(), 3);
        fsm.close().unwrap();
    }

    #[test]
    fn jobs_may_drive_the_engine_directly() {
        let fsm = toggling_scheduler();
        let state = fsm
            .with_engine(|engine| {
                engine.process_event(&switch())?;
                Ok::<_, FsmError>(engine.current_state().clone())
            })
            .unwrap()
            .unwrap();
        assert_eq!(state, on());
        fsm.close().unwrap();
    }

    #[test]
    fn engine_errors_pass_through() {
        let fsm = SerializedScheduler::new(Engine::<_, StringEvent, ()>::new(off(), ())).unwrap();
        assert!(fsm.submit(switch()).unwrap_err().is_no_transition());
        fsm.close().unwrap();
    }

    #[test]
    fn dispatched_events_complete_in_fifo_order() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let record = Arc::clone(&seen);

        let fsm = SerializedScheduler::new(Engine::<_, NumberedTick, ()>::new(off(), ())).unwrap();
        fsm.add_event("tick").unwrap();
        fsm.add_transition(
            &off(),
            "tick",
            &off(),
            ActionFn::new(move |_: &mut (), event: &NumberedTick| {
                std::thread::sleep(Duration::from_millis(2));
                record.lock().unwrap().push(event.0);
                Ok(())
            }),
            Always,
        )
        .unwrap();

        let pending: Vec<_> = (0..10).map(|i| fsm.dispatch(NumberedTick(i)).unwrap()).collect();
        for completion in pending {
            completion.wait().unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
        fsm.close().unwrap();
    }

    struct NumberedTick(u32);

    impl Event for NumberedTick {
        fn id(&self) -> &str {
            "tick"
        }
    }

    #[test]
    fn close_is_idempotent_and_rejects_later_calls() {
        let fsm = SerializedScheduler::new(Engine::<_, StringEvent, ()>::new(off(), ())).unwrap();
        fsm.add_state(on()).unwrap();
        fsm.add_event("switch").unwrap();
        fsm.add_transition(&off(), "switch", &on(), NoOp, Always).unwrap();

        fsm.close().unwrap();
        fsm.close().unwrap();

        assert!(matches!(fsm.submit(switch()), Err(FsmError::Closed)));
        assert!(matches!(fsm.current_state(), Err(FsmError::Closed)));
    }
}
