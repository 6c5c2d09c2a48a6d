//! Declarative definition of closed event domains.

/// Define a closed event domain as a plain enum.
///
/// The generated enum implements [`Event`](crate::Event) and
/// [`EventSet`](crate::EventSet): each variant gets a stable identifier
/// hashed from its qualified name (`"Enum::Variant"`), so identifiers
/// survive reordering and recompilation, and the set impl recognizes exactly
/// the variants listed here.
///
/// # Example
///
/// ```rust
/// use flywheel::{event_set, Event, EventSet};
///
/// event_set! {
///     /// Everything the player can do to a door.
///     pub enum DoorEvent {
///         Knock,
///         Slam,
///     }
/// }
///
/// assert_ne!(DoorEvent::Knock.id(), DoorEvent::Slam.id());
/// assert!(DoorEvent::contains(DoorEvent::Knock.id()));
/// ```
#[macro_export]
macro_rules! event_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::Event for $name {
            fn id(&self) -> $crate::EventId {
                match self {
                    $(
                        Self::$variant => $crate::EventId::of(
                            concat!(stringify!($name), "::", stringify!($variant)),
                        ),
                    )+
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl $crate::EventSet for $name {
            fn domain_name() -> &'static str {
                stringify!($name)
            }

            fn contains(id: $crate::EventId) -> bool {
                const IDS: &[$crate::EventId] = &[
                    $(
                        $crate::EventId::of(
                            concat!(stringify!($name), "::", stringify!($variant)),
                        ),
                    )+
                ];
                IDS.contains(&id)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Event, EventId, EventSet};

    event_set! {
        pub enum Weather {
            Rain,
            Snow,
            Clear,
        }
    }

    event_set! {
        enum Traffic {
            Clear,
        }
    }

    #[test]
    fn variants_get_distinct_stable_ids() {
        assert_ne!(Weather::Rain.id(), Weather::Snow.id());
        assert_eq!(Weather::Rain.id(), EventId::of("Weather::Rain"));
    }

    #[test]
    fn same_variant_name_in_different_domains_differs() {
        assert_ne!(Weather::Clear.id(), Traffic::Clear.id());
    }

    #[test]
    fn no_variant_collides_with_the_pull_sentinel() {
        assert_ne!(Weather::Rain.id(), EventId::NONE);
        assert_ne!(Weather::Snow.id(), EventId::NONE);
        assert_ne!(Weather::Clear.id(), EventId::NONE);
    }

    #[test]
    fn contains_covers_exactly_the_listed_variants() {
        assert!(Weather::contains(Weather::Snow.id()));
        assert!(!Weather::contains(Traffic::Clear.id()));
        assert!(!Weather::contains(EventId::NONE));
    }

    #[test]
    fn names_are_human_readable() {
        assert_eq!(Weather::domain_name(), "Weather");
        assert_eq!(Weather::Snow.name(), "Snow");
    }
}
