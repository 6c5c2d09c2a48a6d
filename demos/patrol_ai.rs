//! Patrol AI
//!
//! This example demonstrates a pull-driven state machine for a game agent.
//!
//! Key concepts:
//! - Polling guards once per frame with `advance()`
//! - Priority weights and tie-breaking
//! - Wildcard transitions preempting state-specific ones
//! - The committed-transition trace
//!
//! Run with: cargo run --example patrol_ai

use flywheel::{Machine, MachineState};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
struct Idle;

impl MachineState for Idle {
    fn on_enter(&mut self) {
        println!("  [Idle] standing around");
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Patrol {
    steps: u32,
}

impl MachineState for Patrol {
    fn on_tick(&mut self) {
        self.steps += 1;
        println!("  [Patrol] step {}", self.steps);
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Chase;

impl MachineState for Chase {
    fn on_enter(&mut self) {
        println!("  [Chase] target spotted!");
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Stunned;

impl MachineState for Stunned {
    fn on_enter(&mut self) {
        println!("  [Stunned] seeing stars");
    }

    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Patrol AI ===\n");

    let alert = Rc::new(Cell::new(false));
    let target_visible = Rc::new(Cell::new(false));
    let hit = Rc::new(Cell::new(false));

    let mut machine = Machine::new();

    let a = alert.clone();
    machine.from::<Idle>().to::<Patrol>().when(move || a.get()).build()?;

    // Chasing outranks returning to idle when both are possible.
    let t = target_visible.clone();
    machine
        .from::<Patrol>()
        .to::<Chase>()
        .when(move || t.get())
        .weight(2.0)
        .named("spotted")
        .build()?;
    let a = alert.clone();
    machine
        .from::<Patrol>()
        .to::<Idle>()
        .when(move || !a.get())
        .build()?;

    let t = target_visible.clone();
    machine
        .from::<Chase>()
        .to::<Patrol>()
        .when(move || !t.get())
        .build()?;

    // Getting hit interrupts anything, whatever the local weights say.
    let h = hit.clone();
    machine
        .from_any()
        .to::<Stunned>()
        .when(move || h.get())
        .named("hit")
        .build()?;
    machine.from::<Stunned>().to_previous().when(|| true).build()?;

    machine.set_initial::<Idle>()?;

    println!("frame 1 (quiet):");
    machine.advance()?;

    println!("frame 2 (alarm raised):");
    alert.set(true);
    machine.advance()?;

    println!("frames 3-4 (patrolling):");
    machine.advance()?;
    machine.advance()?;

    println!("frame 5 (target in sight):");
    target_visible.set(true);
    machine.advance()?;

    println!("frame 6 (hit mid-chase):");
    hit.set(true);
    machine.advance()?;

    println!("frame 7 (recovering, back to previous):");
    hit.set(false);
    machine.advance()?;

    println!("\nPath taken: {:?}", machine.trace().path());
    println!("\nDiagram:\n{}", machine.diagram());

    Ok(())
}
