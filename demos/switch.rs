//! Light Switch
//!
//! Drives the same on/off engine with both schedulers.
//!
//! Key concepts:
//! - Serialized scheduling: every submission runs, in order
//! - Preemptive scheduling: a waiting submission is dropped when a newer one arrives
//! - Registering states, events and transitions through a running scheduler
//!
//! Run with: RUST_LOG=statelane=debug cargo run --example switch

use statelane::core::{ActionFn, Always, FsmError, StringEvent, StringState};
use statelane::engine::Engine;
use statelane::scheduler::{PreemptiveScheduler, Scheduler, SerializedScheduler};
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "switch=info".parse() {
        filter = filter.add_directive(directive);
    }
    fmt().with_env_filter(filter).with_thread_names(true).init();
}

/// Register `off <-> on`, each toggle sleeping for `delay` and counting itself.
fn wire<F>(fsm: &F, delay: Duration) -> Result<(), FsmError>
where
    F: Scheduler<State = StringState, Event = StringEvent, Payload = u32>,
{
    let (off, on) = (StringState::new("off"), StringState::new("on"));
    fsm.add_state(on.clone())?;
    fsm.add_event("switch")?;

    for (from, to) in [(off.clone(), on.clone()), (on, off)] {
        fsm.add_transition(
            &from,
            "switch",
            &to,
            ActionFn::new(move |count: &mut u32, _: &StringEvent| {
                thread::sleep(delay);
                *count += 1;
                Ok(())
            }),
            Always,
        )?;
    }
    Ok(())
}

fn serialized() -> Result<(), FsmError> {
    println!("--- Serialized ---");
    let fsm = SerializedScheduler::new(Engine::new(StringState::new("off"), 0u32))?;
    wire(&fsm, Duration::from_millis(20))?;

    for _ in 0..3 {
        fsm.submit(StringEvent::new("switch"))?;
    }

    let toggles = fsm.with_engine(|engine| *engine.payload())?;
    println!("state: {}, toggles: {}", fsm.current_state()?, toggles);
    println!("path: {}", fsm.history()?.get_path().join(" -> "));
    fsm.close()
}

fn preemptive() -> Result<(), FsmError> {
    println!("\n--- Preemptive ---");
    let fsm = PreemptiveScheduler::new(Engine::new(StringState::new("off"), 0u32))?;
    wire(&fsm, Duration::from_millis(100))?;

    let first = fsm.dispatch(StringEvent::new("switch"))?;
    thread::sleep(Duration::from_millis(10));
    let second = fsm.dispatch(StringEvent::new("switch"))?;
    thread::sleep(Duration::from_millis(10));
    let third = fsm.submit(StringEvent::new("switch"));

    for (name, outcome) in [("first", first.wait()), ("second", second.wait()), ("third", third)] {
        match outcome {
            Ok(()) => println!("{name}: done"),
            Err(err) => println!("{name}: {err}"),
        }
    }

    let toggles = fsm.with_engine(|engine| *engine.payload())?;
    println!("state: {}, toggles: {}", fsm.current_state()?, toggles);
    fsm.close()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    info!("switch demo starting");

    serialized()?;
    preemptive()?;

    info!("switch demo complete");
    Ok(())
}
