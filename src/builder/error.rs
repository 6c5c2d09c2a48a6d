use crate::machine::error::FactoryError;
use std::fmt;

/// Errors surfaced when a transition definition is finalized.
///
/// All validation is deferred to [`build`](crate::TransitionBuilder::build):
/// a failed definition adds nothing to the machine.
///
/// `Display` and `Error` are implemented by hand because the `source` fields
/// below name the transition's source *state*, not an error source, which
/// `thiserror`'s derive cannot express.
#[derive(Debug)]
pub enum BuildError {
    /// The builder was finalized without a destination.
    MissingTarget { source: &'static str },

    /// A transition with the same source and target identity already exists,
    /// whatever its event binding or guard.
    DuplicateTransition {
        source: &'static str,
        target: String,
    },

    /// The transition was bound to an event outside the machine's closed
    /// event domain.
    EventDomainMismatch {
        domain: &'static str,
        event: &'static str,
    },

    /// The payload type carried by the transition does not match the
    /// destination state's declared context slot.
    ContextTypeMismatch {
        state: &'static str,
        expected: &'static str,
        declared: &'static str,
    },

    /// Creating the source or target state failed.
    Factory(FactoryError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingTarget { source } => {
                write!(f, "transition from '{source}' has no target")
            }
            BuildError::DuplicateTransition { source, target } => {
                write!(f, "duplicate transition from '{source}' to '{target}'")
            }
            BuildError::EventDomainMismatch { domain, event } => {
                write!(f, "event '{event}' does not belong to domain '{domain}'")
            }
            BuildError::ContextTypeMismatch {
                state,
                expected,
                declared,
            } => {
                write!(
                    f,
                    "state '{state}' expects context payload '{expected}', transition provides '{declared}'"
                )
            }
            BuildError::Factory(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Factory(err) => err.source(),
            _ => None,
        }
    }
}

impl From<FactoryError> for BuildError {
    fn from(err: FactoryError) -> Self {
        BuildError::Factory(err)
    }
}
