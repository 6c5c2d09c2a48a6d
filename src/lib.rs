//! Flywheel is a hybrid pull/push state machine engine for real-time
//! interactive applications.
//!
//! States are plain types implementing [`MachineState`], cached one live
//! instance per type by an internal factory. The host loop drives the machine
//! in two ways that share one resolution pipeline:
//!
//! - **Pull**: call [`Machine::advance`] once per tick; guards are polled and
//!   at most one transition fires, otherwise the active state ticks.
//! - **Push**: call [`EventMachine::fire`] with a discrete event from a
//!   closed domain declared with [`event_set!`]; unmatched events are
//!   dropped, foreign events are rejected.
//!
//! Resolution runs in two tiers: wildcard ("from any state") transitions
//! strictly preempt the active state's own, and within a tier the highest
//! weight wins with ties broken by definition order. Transitions are defined
//! through a fluent builder with guard combinators, priority weights,
//! reentry control, "Back" and computed targets, and lazy typed payloads for
//! the destination's [`StateContext`] slot. Definitions are validated when
//! finalized, so a machine that builds is a machine that runs.
//!
//! # Example
//!
//! ```rust
//! use flywheel::{Machine, MachineState};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Idle {
//!     ticks: u32,
//! }
//!
//! impl MachineState for Idle {
//!     fn on_tick(&mut self) {
//!         self.ticks += 1;
//!     }
//!
//!     fn auto_create() -> Option<Self> {
//!         Some(Self::default())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Walk;
//!
//! impl MachineState for Walk {
//!     fn auto_create() -> Option<Self> {
//!         Some(Self::default())
//!     }
//! }
//!
//! let speed = Rc::new(Cell::new(0.0f32));
//!
//! let mut machine = Machine::new();
//! let s = speed.clone();
//! machine.from::<Idle>().to::<Walk>().when(move || s.get() > 0.1).build()?;
//! let s = speed.clone();
//! machine.from::<Walk>().to::<Idle>().when(move || s.get() <= 0.1).build()?;
//! machine.set_initial::<Idle>()?;
//!
//! machine.advance()?; // guard false: Idle ticks
//! speed.set(1.0);
//! machine.advance()?; // Idle -> Walk
//! assert!(machine.current_is::<Walk>());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The machine is single-threaded by contract; drive it from one loop and it
//! needs no locks.

pub mod builder;
pub mod core;
mod diagram;
pub mod machine;

pub use builder::{BuildError, TransitionBuilder};
pub use core::{
    ContextSlot, Event, EventId, EventSet, Guard, MachineState, StateContext, StateId,
    TraceRecord, TransitionTrace,
};
pub use machine::{EventMachine, FactoryError, Machine, MachineError, StateFactory, Step};
