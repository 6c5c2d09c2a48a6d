//! Event identifiers and closed event-identifier domains.
//!
//! Events are plain integers on the wire of the engine, typically a hash of a
//! symbolic identifier. A push machine is bound at construction to one closed
//! domain (an [`EventSet`]); all bindings and fires are validated against it,
//! preventing cross-enumeration identifier collisions that would otherwise be
//! silently ambiguous.

use serde::{Deserialize, Serialize};

/// Discrete event identifier.
///
/// [`EventId::NONE`] is reserved as the pull sentinel: transitions carrying it
/// are evaluated only by `advance()`, never by `fire(...)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct EventId(u64);

impl EventId {
    /// Reserved sentinel meaning "pull-only, no event required".
    pub const NONE: EventId = EventId(0);

    /// Derive an identifier from a symbolic name (FNV-1a, 64 bit).
    ///
    /// The zero value is reserved for [`EventId::NONE`] and is remapped if
    /// the hash ever produces it.
    pub const fn of(name: &str) -> EventId {
        let bytes = name.as_bytes();
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            i += 1;
        }
        if hash == 0 {
            hash = 0xcbf2_9ce4_8422_2325;
        }
        EventId(hash)
    }

    /// The raw integer value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A fireable event value.
///
/// Usually implemented on an enum via the [`event_set!`](crate::event_set)
/// macro, which derives the identifier from the qualified variant name.
pub trait Event {
    /// The event's integer identifier.
    fn id(&self) -> EventId;

    /// The event's symbolic name, for diagnostics.
    fn name(&self) -> &'static str;
}

/// A closed event-identifier domain.
///
/// A push machine bound to `E` only accepts identifiers for which
/// `E::contains` holds, at both binding time (`on(...)`) and fire time.
pub trait EventSet: 'static {
    /// The domain's name, for diagnostics.
    fn domain_name() -> &'static str;

    /// Whether `id` belongs to this domain.
    fn contains(id: EventId) -> bool;
}

/// Runtime descriptor of a bound domain, carried by the machine so the
/// builder can validate `on(...)` without being generic over the set.
#[derive(Copy, Clone)]
pub(crate) struct EventDomain {
    pub(crate) name: &'static str,
    pub(crate) contains: fn(EventId) -> bool,
}

impl EventDomain {
    pub(crate) fn of<E: EventSet>() -> Self {
        EventDomain {
            name: E::domain_name(),
            contains: E::contains,
        }
    }
}
