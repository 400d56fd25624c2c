//! "Latest submission wins" scheduler.
//!
//! A dispatcher thread receives submissions and swaps each one into a
//! single-slot mailbox; a worker thread claims whatever sits in the slot and
//! runs it against the engine. A submission still waiting in the slot when a
//! newer one arrives is completed with `Preempted` instead of being run.
//! Once the worker has claimed an entry nothing can displace it.
//!
//! ```text
//! submit ──► handoff queue ──► dispatcher ──swap──► [ next ] ──claim──► worker ──► Engine
//!                                   │                                      │
//!                                   └── displaced entry: Preempted         └── Completion
//! ```

use super::command::{
    disconnected, engine_job, ensure_not_reentrant, run_job, wait_job, Command, EngineJob,
    Submission,
};
use super::completion::Completion;
use super::config::SchedulerConfig;
use super::Scheduler;
use crate::core::{Event, FsmError, State};
use crate::engine::{dispatch, Engine};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

struct Mailbox<S: State, E: Event, P> {
    /// The one submission allowed to wait for the worker.
    next: Option<Submission<E>>,
    /// Registry jobs; never preempted, run before the next submission.
    control: VecDeque<EngineJob<S, E, P>>,
    exit: bool,
    worker_alive: bool,
}

struct Shared<S: State, E: Event, P> {
    mailbox: Mutex<Mailbox<S, E, P>>,
    changed: Condvar,
}

impl<S: State, E: Event, P> Shared<S, E, P> {
    fn new() -> Self {
        Self {
            mailbox: Mutex::new(Mailbox {
                next: None,
                control: VecDeque::new(),
                exit: false,
                worker_alive: true,
            }),
            changed: Condvar::new(),
        }
    }

    /// Set the exit flag and hand back the unclaimed submission, if any.
    fn shut(&self) -> Option<Submission<E>> {
        let displaced = {
            let mut mailbox = self.mailbox.lock();
            mailbox.exit = true;
            mailbox.next.take()
        };
        self.changed.notify_one();
        displaced
    }
}

enum Work<S: State, E: Event, P> {
    Submit(Submission<E>),
    Configure(EngineJob<S, E, P>),
}

/// Drives an engine with preemption: while the worker is busy, only the most
/// recent submission is kept; every earlier waiting one fails with
/// [`FsmError::Preempted`].
///
/// Submissions are not processed in FIFO order. The only guarantee is that
/// a submission the worker has started always finishes.
pub struct PreemptiveScheduler<S: State, E: Event, P: Send + 'static> {
    engine_id: Uuid,
    tx: Sender<Command<S, E, P>>,
    closed: AtomicBool,
    threads: Mutex<Option<(JoinHandle<()>, JoinHandle<()>)>>,
}

impl<S: State, E: Event, P: Send + 'static> PreemptiveScheduler<S, E, P> {
    /// Take ownership of `engine` and start the dispatcher and worker with
    /// default settings.
    pub fn new(engine: Engine<S, E, P>) -> Result<Self, FsmError> {
        Self::with_config(engine, SchedulerConfig::default())
    }

    /// Take ownership of `engine` and start the dispatcher and worker.
    pub fn with_config(engine: Engine<S, E, P>, config: SchedulerConfig) -> Result<Self, FsmError> {
        let engine_id = engine.id();
        let shared = Arc::new(Shared::new());
        let (tx, rx) = bounded(config.queue_capacity);

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(config.worker_thread_name())
            .spawn(move || run_worker(engine, worker_shared))?;

        let dispatcher_shared = Arc::clone(&shared);
        let dispatcher = thread::Builder::new()
            .name(config.dispatcher_thread_name())
            .spawn(move || run_dispatcher(engine_id, dispatcher_shared, rx));

        let dispatcher = match dispatcher {
            Ok(handle) => handle,
            Err(err) => {
                shared.shut();
                let _ = worker.join();
                return Err(err.into());
            }
        };

        Ok(Self {
            engine_id,
            tx,
            closed: AtomicBool::new(false),
            threads: Mutex::new(Some((dispatcher, worker))),
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

fn run_dispatcher<S: State, E: Event, P>(
    engine_id: Uuid,
    shared: Arc<Shared<S, E, P>>,
    rx: Receiver<Command<S, E, P>>,
) {
    info!(engine = %engine_id, "preemptive dispatcher started");

    while let Ok(command) = rx.recv() {
        match command {
            Command::Submit(submission) => {
                let displaced = {
                    let mut mailbox = shared.mailbox.lock();
                    if !mailbox.worker_alive {
                        debug!(
                            engine = %engine_id,
                            event = submission.event_id(),
                            "worker gone, submission abandoned"
                        );
                        continue;
                    }
                    mailbox.next.replace(submission)
                };
                shared.changed.notify_one();

                if let Some(displaced) = displaced {
                    debug!(engine = %engine_id, event = displaced.event_id(), "event preempted");
                    displaced.complete(Err(FsmError::Preempted));
                }
            }
            Command::Configure(job) => {
                {
                    let mut mailbox = shared.mailbox.lock();
                    if !mailbox.worker_alive {
                        continue;
                    }
                    mailbox.control.push_back(job);
                }
                shared.changed.notify_one();
            }
            Command::Shutdown => break,
        }
    }

    if let Some(displaced) = shared.shut() {
        debug!(engine = %engine_id, event = displaced.event_id(), "event preempted by shutdown");
        displaced.complete(Err(FsmError::Preempted));
    }
    info!(engine = %engine_id, "preemptive dispatcher stopped");
}

/// Marks the worker dead when it returns or unwinds, so that nothing is left
/// waiting on a slot nobody will claim.
struct WorkerLiveness<'a, S: State, E: Event, P> {
    engine_id: Uuid,
    shared: &'a Shared<S, E, P>,
}

impl<S: State, E: Event, P> Drop for WorkerLiveness<'_, S, E, P> {
    fn drop(&mut self) {
        let (next, control) = {
            let mut mailbox = self.shared.mailbox.lock();
            mailbox.worker_alive = false;
            (mailbox.next.take(), std::mem::take(&mut mailbox.control))
        };
        if thread::panicking() {
            warn!(engine = %self.engine_id, "preemptive worker panicked");
        }
        // dropping the pending entries resolves their callers as abandoned
        drop(next);
        drop(control);
    }
}

fn run_worker<S: State, E: Event, P>(mut engine: Engine<S, E, P>, shared: Arc<Shared<S, E, P>>) {
    let engine_id = engine.id();
    let _liveness = WorkerLiveness {
        engine_id,
        shared: &shared,
    };
    info!(engine = %engine_id, "preemptive worker started");

    loop {
        let work = {
            let mut mailbox = shared.mailbox.lock();
            loop {
                if let Some(job) = mailbox.control.pop_front() {
                    break Work::Configure(job);
                }
                if mailbox.exit {
                    info!(engine = %engine_id, "preemptive worker stopped");
                    return;
                }
                if let Some(submission) = mailbox.next.take() {
                    break Work::Submit(submission);
                }
                shared.changed.wait(&mut mailbox);
            }
        };

        match work {
            Work::Submit(submission) => {
                debug!(engine = %engine_id, event = submission.event_id(), "event claimed");
                let result = engine.process_event(&submission.event);
                submission.complete(result);
            }
            Work::Configure(job) => run_job(&mut engine, job),
        }
    }
}

impl<S: State, E: Event, P: Send + 'static> Scheduler for PreemptiveScheduler<S, E, P> {
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
        let mut threads = self.threads.lock();
        let Some((dispatcher, worker)) = threads.take() else {
            return Ok(());
        };

        self.closed.store(true, Ordering::Release);
        let _ = self.tx.send(Command::Shutdown);

        let dispatcher = dispatcher.join();
        let worker = worker.join();
        if dispatcher.is_err() || worker.is_err() {
            warn!(engine = %self.engine_id, "preemptive scheduler stopped after a panic");
            return Err(FsmError::WorkerPanicked);
        }
        Ok(())
    }
}

impl<S: State, E: Event, P: Send + 'static> Drop for PreemptiveScheduler<S, E, P> {
    fn drop(&mut self) {
        if dispatch::is_active(self.engine_id) {
            return;
        }
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionFn, Always, NoOp, StringEvent, StringState};
    use std::sync::mpsc;
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

    /// Engine whose `off -> on` action blocks until the test releases it.
    fn gated_engine(
        started: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
    ) -> Engine<StringState, StringEvent, u32> {
        let mut engine = Engine::new(off(), 0);
        engine.add_state(on()).unwrap();
        engine.add_event("switch").unwrap();
        engine
            .add_transition(
                &off(),
                "switch",
                &on(),
                ActionFn::new(move |count: &mut u32, _: &StringEvent| {
                    started.send(()).unwrap();
                    release.recv().unwrap();
                    *count += 1;
                    Ok(())
                }),
                Always,
            )
            .unwrap();
        engine
            .add_transition(
                &on(),
                "switch",
                &off(),
                ActionFn::new(|count: &mut u32, _: &StringEvent| {
                    *count += 1;
                    Ok(())
                }),
                Always,
            )
            .unwrap();
        engine
    }

    #[test]
    fn idle_worker_runs_submission() {
        let mut engine = Engine::<_, StringEvent, ()>::new(off(), ());
        engine.add_state(on()).unwrap();
        engine.add_event("switch").unwrap();
        engine.add_transition(&off(), "switch", &on(), NoOp, Always).unwrap();

        let fsm = PreemptiveScheduler::new(engine).unwrap();
        fsm.submit(switch()).unwrap();
        assert_eq!(fsm.current_state().unwrap(), on());
        fsm.close().unwrap();
    }

    #[test]
    fn waiting_submission_is_preempted_by_newer_one() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let fsm = PreemptiveScheduler::new(gated_engine(started_tx, release_rx)).unwrap();

        let first = fsm.dispatch(switch()).unwrap();
        started_rx.recv().unwrap();

        let second = fsm.dispatch(switch()).unwrap();
        let third = fsm.dispatch(switch()).unwrap();

        // the dispatcher resolves `second` as soon as `third` lands in the slot
        assert!(second.wait().unwrap_err().is_preempted());

        release_tx.send(()).unwrap();
        first.wait().unwrap();
        third.wait().unwrap();

        assert_eq!(fsm.current_state().unwrap(), off());
        assert_eq!(fsm.with_engine(|engine| *engine.payload()).unwrap(), 2);
        fsm.close().unwrap();
    }

    #[test]
    fn registry_jobs_are_never_preempted() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let fsm = PreemptiveScheduler::new(gated_engine(started_tx, release_rx)).unwrap();

        let first = fsm.dispatch(switch()).unwrap();
        started_rx.recv().unwrap();

        let waiting = fsm.dispatch(switch()).unwrap();
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            release_tx.send(()).unwrap();
        });

        // runs on the worker after `first`, ahead of `waiting`
        let state_after_first = fsm.current_state().unwrap();
        assert_eq!(state_after_first, on());

        first.wait().unwrap();
        waiting.wait().unwrap();
        assert_eq!(fsm.current_state().unwrap(), off());
        releaser.join().unwrap();
        fsm.close().unwrap();
    }

    #[test]
    fn close_preempts_unclaimed_submission() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let fsm = Arc::new(PreemptiveScheduler::new(gated_engine(started_tx, release_rx)).unwrap());

        let first = fsm.dispatch(switch()).unwrap();
        started_rx.recv().unwrap();
        let waiting = fsm.dispatch(switch()).unwrap();

        let closer = {
            let fsm = Arc::clone(&fsm);
            thread::spawn(move || fsm.close())
        };

        assert!(waiting.wait().unwrap_err().is_preempted());
        release_tx.send(()).unwrap();
        first.wait().unwrap();
        closer.join().unwrap().unwrap();

        assert!(matches!(fsm.submit(switch()), Err(FsmError::Closed)));
    }
}
