//! Fluent builders and the event-domain macro.

pub mod error;
mod macros;
pub mod transition;

pub use error::BuildError;
pub use transition::TransitionBuilder;
