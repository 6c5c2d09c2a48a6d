//! Core data model of the engine.
//!
//! This module contains the parts that carry no dispatch logic of their own:
//! - State definitions via the [`MachineState`] trait and [`StateId`] tokens
//! - Guard predicates for transition eligibility
//! - Event identifiers and closed event domains
//! - The committed-transition trace

mod event;
mod guard;
mod state;
mod trace;

pub use event::{Event, EventId, EventSet};
pub use guard::Guard;
pub use state::{ContextSlot, MachineState, StateContext, StateId};
pub use trace::{TraceRecord, TransitionTrace};

pub(crate) use event::EventDomain;
pub(crate) use state::short_type_name;
