//! Combat Events
//!
//! This example demonstrates an event-driven machine with a closed domain.
//!
//! Key concepts:
//! - Declaring an event domain with `event_set!`
//! - Pushing events with `fire()` and observing drops
//! - Lazy typed payloads read through a `StateContext`
//! - Exporting the graph as a Mermaid diagram
//!
//! Run with: cargo run --example combat_events

use flywheel::{event_set, ContextSlot, EventMachine, MachineState, StateContext, Step};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
struct Fighting;

impl MachineState for Fighting {
    fn on_enter(&mut self) {
        println!("  [Fighting] fists up");
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Staggered {
    damage: StateContext<u32>,
}

impl MachineState for Staggered {
    fn on_enter(&mut self) {
        match self.damage.get() {
            Some(amount) => println!("  [Staggered] took {amount} damage"),
            None => println!("  [Staggered] shaken, unhurt"),
        }
    }

    fn context_slot(&mut self) -> Option<&mut dyn ContextSlot> {
        Some(&mut self.damage)
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Downed;

impl MachineState for Downed {
    fn on_enter(&mut self) {
        println!("  [Downed] out cold");
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

event_set! {
    /// Everything that can happen to this fighter.
    pub enum Combat {
        Hit,
        HeavyHit,
        Recover,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Combat Events ===\n");

    let last_blow = Rc::new(Cell::new(0u32));

    let mut machine = EventMachine::<Combat>::new();

    let b = last_blow.clone();
    machine
        .from::<Fighting>()
        .to::<Staggered>()
        .on(Combat::Hit)
        .with_context(move || b.get())
        .build()?;
    machine
        .from::<Fighting>()
        .to::<Downed>()
        .on(Combat::HeavyHit)
        .named("knockout")
        .build()?;
    machine
        .from::<Staggered>()
        .to::<Fighting>()
        .on(Combat::Recover)
        .build()?;
    machine
        .from::<Staggered>()
        .to::<Downed>()
        .on(Combat::HeavyHit)
        .build()?;

    machine.set_initial::<Fighting>()?;

    println!("jab lands for 12:");
    last_blow.set(12);
    machine.fire(Combat::Hit)?;

    println!("shaking it off:");
    machine.fire(Combat::Recover)?;

    println!("a recover while already fighting is simply dropped:");
    if let Step::Dropped(id) = machine.fire(Combat::Recover)? {
        println!("  dropped event {:?}", id);
    }

    println!("haymaker:");
    machine.fire(Combat::HeavyHit)?;

    println!("\nPath taken: {:?}", machine.trace().path());
    println!("\nDiagram:\n{}", machine.diagram());

    Ok(())
}
