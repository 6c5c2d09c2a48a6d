//! Property-based checks of selection, guards, identifiers, and tracing.

use flywheel::{EventId, Guard, Machine, MachineState};
use proptest::prelude::*;

#[derive(Default)]
struct Idle;

impl MachineState for Idle {
    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Walk;

impl MachineState for Walk {
    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Stunned;

impl MachineState for Stunned {
    fn auto_create() -> Option<Self> {
        Some(Self::default())
    }
}

proptest! {
    #[test]
    fn strictly_greater_weight_always_wins(w1 in 0u32..1000, w2 in 0u32..1000) {
        prop_assume!(w1 != w2);

        let mut machine = Machine::new();
        machine
            .from::<Idle>()
            .to::<Walk>()
            .weight(f64::from(w1))
            .build()
            .unwrap();
        machine
            .from::<Idle>()
            .to::<Stunned>()
            .weight(f64::from(w2))
            .build()
            .unwrap();
        machine.set_initial::<Idle>().unwrap();
        machine.advance().unwrap();

        prop_assert_eq!(machine.current_is::<Walk>(), w1 > w2);
        prop_assert_eq!(machine.current_is::<Stunned>(), w2 > w1);
    }

    #[test]
    fn equal_weights_resolve_to_the_first_registered(w in 0u32..1000) {
        let mut machine = Machine::new();
        machine
            .from::<Idle>()
            .to::<Walk>()
            .weight(f64::from(w))
            .build()
            .unwrap();
        machine
            .from::<Idle>()
            .to::<Stunned>()
            .weight(f64::from(w))
            .build()
            .unwrap();
        machine.set_initial::<Idle>().unwrap();
        machine.advance().unwrap();

        prop_assert!(machine.current_is::<Walk>());
    }

    #[test]
    fn event_ids_are_deterministic_and_never_the_sentinel(name in "[A-Za-z][A-Za-z0-9_]{0,24}") {
        prop_assert_eq!(EventId::of(&name), EventId::of(&name));
        prop_assert_ne!(EventId::of(&name), EventId::NONE);
    }

    #[test]
    fn distinct_names_hash_to_distinct_ids(
        a in "[A-Za-z][A-Za-z0-9_]{0,24}",
        b in "[A-Za-z][A-Za-z0-9_]{0,24}",
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(EventId::of(&a), EventId::of(&b));
    }

    #[test]
    fn guard_combinators_bind_left_to_right(a: bool, b: bool, c: bool) {
        let or_then_and = Guard::new(move || a).or(move || b).and(move || c);
        prop_assert_eq!(or_then_and.check(), (a || b) && c);

        let and_then_or = Guard::new(move || a).and(move || b).or(move || c);
        prop_assert_eq!(and_then_or.check(), (a && b) || c);
    }

    #[test]
    fn trace_grows_by_one_hop_per_transition(steps in 1usize..20) {
        let mut machine = Machine::new();
        machine.from::<Idle>().to::<Walk>().build().unwrap();
        machine.from::<Walk>().to::<Idle>().build().unwrap();
        machine.set_initial::<Idle>().unwrap();

        for _ in 0..steps {
            machine.advance().unwrap();
        }

        let path = machine.trace().path();
        prop_assert_eq!(path.len(), steps + 1);
        for (i, name) in path.iter().enumerate() {
            let expected = if i % 2 == 0 { "Idle" } else { "Walk" };
            prop_assert_eq!(*name, expected);
        }
    }
}
