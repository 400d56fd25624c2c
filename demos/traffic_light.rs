//! Traffic Light State Machine
//!
//! A cyclic machine declared with the enum macros and run on a serialized
//! scheduler.
//!
//! Key concepts:
//! - `state_enum!` / `event_enum!` for identifier boilerplate
//! - Guards over the payload choosing between transitions
//! - An action that refuses a transition without moving the state
//!
//! Run with: cargo run --example traffic_light

use statelane::builder::{EngineBuilder, TransitionBuilder};
use statelane::core::FsmError;
use statelane::scheduler::{Scheduler, SerializedScheduler};
use statelane::{event_enum, state_enum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

state_enum! {
    enum Light {
        Red => "red",
        Green => "green",
        Yellow => "yellow",
    }
}

event_enum! {
    enum Signal {
        Timer => "timer",
        Maintenance => "maintenance",
    }
}

/// Intersection sensors seen by guards and actions.
#[derive(Default)]
struct Intersection {
    cars_waiting: u32,
    pedestrians_crossing: bool,
    cycles: u32,
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "statelane=debug".parse() {
        filter = filter.add_directive(directive);
    }
    fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    println!("=== Traffic Light State Machine ===\n");

    let engine = EngineBuilder::<Light, Signal, _>::new(Light::Red, Intersection::default())
        .states([Light::Green, Light::Yellow])
        .events(["timer", "maintenance"])
        // red holds while nobody is waiting
        .transition(
            TransitionBuilder::new()
                .from(Light::Red)
                .on("timer")
                .to(Light::Green)
                .when(|road: &Intersection, _: &Signal| road.cars_waiting > 0)
                .then(|road: &mut Intersection, _: &Signal| {
                    if road.pedestrians_crossing {
                        return Err("pedestrians still crossing".into());
                    }
                    road.cars_waiting = 0;
                    Ok(())
                }),
        )
        .transition(TransitionBuilder::new().from(Light::Green).on("timer").to(Light::Yellow))
        .transition(
            TransitionBuilder::new()
                .from(Light::Yellow)
                .on("timer")
                .to(Light::Red)
                .then(|road: &mut Intersection, _: &Signal| {
                    road.cycles += 1;
                    Ok(())
                }),
        )
        .transition(TransitionBuilder::new().from(Light::Green).on("maintenance").to(Light::Red))
        .build()?;

    let lights = SerializedScheduler::new(engine)?;
    info!(engine = %lights.engine_id(), "traffic light running");

    report(&lights, lights.submit(Signal::Timer))?;

    lights.with_engine(|engine| {
        let road = engine.payload_mut();
        road.cars_waiting = 3;
        road.pedestrians_crossing = true;
    })?;
    report(&lights, lights.submit(Signal::Timer))?;

    lights.with_engine(|engine| engine.payload_mut().pedestrians_crossing = false)?;
    for _ in 0..3 {
        report(&lights, lights.submit(Signal::Timer))?;
    }
    report(&lights, lights.submit(Signal::Maintenance))?;

    let cycles = lights.with_engine(|engine| engine.payload().cycles)?;
    println!("\nCompleted cycles: {cycles}");
    println!("Path: {}", lights.history()?.get_path().join(" -> "));

    lights.close()?;
    println!("\n=== Example Complete ===");
    Ok(())
}

fn report(
    lights: &SerializedScheduler<Light, Signal, Intersection>,
    outcome: Result<(), FsmError>,
) -> Result<(), FsmError> {
    let light = lights.current_state()?;
    match outcome {
        Ok(()) => println!("-> {light:?}"),
        Err(err) if err.is_no_transition() => println!("   {light:?} holds ({err})"),
        Err(err @ FsmError::Action(_)) => println!("   {light:?} holds: {err}"),
        Err(err) => return Err(err),
    }
    Ok(())
}
