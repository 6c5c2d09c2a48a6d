//! Machine and factory errors.
//!
//! All of these are programmer-contract violations raised synchronously at
//! the offending call. There is no partial-failure state: either the whole
//! operation completes or the machine is left unchanged.

use crate::core::EventId;
use thiserror::Error;

/// Errors raised by the state factory.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("no constructor registered for state '{state}' and auto-create is disabled")]
    UnregisteredType { state: &'static str },

    #[error("constructor for state '{state}' produced no instance")]
    Construction { state: &'static str },
}

/// Errors raised by the evaluation entry points.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("evaluation requested before an initial state was set")]
    NotInitialized,

    #[error("event '{event}' ({id:?}) does not belong to the bound domain '{domain}'")]
    EventDomainMismatch {
        domain: &'static str,
        event: &'static str,
        id: EventId,
    },

    #[error(transparent)]
    Factory(#[from] FactoryError),
}
