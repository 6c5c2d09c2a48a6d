//! Machine engine: state factory, transitions, and dispatch.

pub mod error;
pub mod factory;
pub mod machine;
pub mod transition;

pub use error::{FactoryError, MachineError};
pub use factory::StateFactory;
pub use machine::{EventMachine, Machine, Step};
pub use transition::{Target, Transition};
