//! Fluent transition definition.

use crate::builder::error::BuildError;
use crate::core::{ContextSlot, Event, EventId, Guard, MachineState, StateId};
use crate::core::short_type_name;
use crate::machine::machine::Machine;
use crate::machine::transition::{PayloadProvider, Target, Transition};
use std::any::{type_name, TypeId};
use std::rc::Rc;

enum Source {
    State(StateId),
    Any,
}

/// Fluent builder for a single transition.
///
/// Obtained from [`Machine::from`], [`Machine::from_any`], or their
/// [`EventMachine`](crate::EventMachine) counterparts. Every method consumes
/// the builder, so a definition cannot be finalized twice. Nothing is added
/// to the machine until [`build`](TransitionBuilder::build) (or its alias
/// [`always`](TransitionBuilder::always)) succeeds; errors detected along the
/// way are held back and surfaced there.
///
/// # Example
///
/// ```rust
/// use flywheel::{Machine, MachineState};
///
/// #[derive(Default)]
/// struct Patrol;
/// impl MachineState for Patrol {
///     fn auto_create() -> Option<Self> { Some(Self::default()) }
/// }
///
/// #[derive(Default)]
/// struct Chase;
/// impl MachineState for Chase {
///     fn auto_create() -> Option<Self> { Some(Self::default()) }
/// }
///
/// let mut machine = Machine::new();
/// machine
///     .from::<Patrol>()
///     .to::<Chase>()
///     .when(|| true)
///     .and(|| true)
///     .weight(2.0)
///     .named("spotted")
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TransitionBuilder<'m> {
    machine: &'m mut Machine,
    source: Source,
    source_name: &'static str,
    target: Option<Target>,
    target_name: Option<&'static str>,
    guard: Option<Guard>,
    event: EventId,
    weight: f64,
    allow_reentry: bool,
    name: Option<String>,
    payload: Option<PayloadProvider>,
    error: Option<BuildError>,
}

impl<'m> TransitionBuilder<'m> {
    pub(crate) fn from_state<S: MachineState>(machine: &'m mut Machine) -> Self {
        let error = machine.factory.get_or_create::<S>().err().map(Into::into);
        Self::start(machine, Source::State(StateId::of::<S>()), short_type_name::<S>(), error)
    }

    pub(crate) fn from_any(machine: &'m mut Machine) -> Self {
        Self::start(machine, Source::Any, "AnyState", None)
    }

    fn start(
        machine: &'m mut Machine,
        source: Source,
        source_name: &'static str,
        error: Option<BuildError>,
    ) -> Self {
        Self {
            machine,
            source,
            source_name,
            target: None,
            target_name: None,
            guard: None,
            event: EventId::NONE,
            weight: 1.0,
            allow_reentry: false,
            name: None,
            payload: None,
            error,
        }
    }

    /// Set a fixed destination. Creates `S` on first use.
    pub fn to<S: MachineState>(mut self) -> Self {
        if let Err(err) = self.machine.factory.get_or_create::<S>() {
            self.error.get_or_insert(err.into());
        }
        self.target = Some(Target::Fixed(StateId::of::<S>()));
        self.target_name = Some(short_type_name::<S>());
        self
    }

    /// Target whatever state was active before the current one ("Back"
    /// semantics). Resolved at dispatch time; skipped silently when there is
    /// no history yet.
    pub fn to_previous(mut self) -> Self {
        self.target = Some(Target::Previous);
        self.target_name = None;
        self
    }

    /// Target the state chosen by `resolve` at dispatch time. Returning
    /// `None` makes the transition ineligible for that evaluation.
    pub fn to_resolved<F>(mut self, resolve: F) -> Self
    where
        F: Fn() -> Option<StateId> + 'static,
    {
        self.target = Some(Target::Resolved(Box::new(resolve)));
        self.target_name = None;
        self
    }

    /// Bind the transition to a discrete event instead of the pull sentinel.
    ///
    /// On a machine with a closed event domain, an event from the wrong
    /// domain is rejected when the definition is finalized.
    pub fn on(mut self, event: impl Event) -> Self {
        if let Some(domain) = &self.machine.event_domain {
            if !(domain.contains)(event.id()) {
                self.error.get_or_insert(BuildError::EventDomainMismatch {
                    domain: domain.name,
                    event: event.name(),
                });
                return self;
            }
        }
        self.event = event.id();
        self
    }

    /// Set the guard predicate, replacing any previous one.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// AND another predicate onto the guard. Order matters: combinators bind
    /// left to right, so `when(a).or(b).and(c)` reads `(a || b) && c`.
    pub fn and<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.guard = Some(match self.guard.take() {
            Some(guard) => guard.and(predicate),
            None => Guard::new(predicate),
        });
        self
    }

    /// OR another predicate onto the guard.
    pub fn or<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.guard = Some(match self.guard.take() {
            Some(guard) => guard.or(predicate),
            None => Guard::new(predicate),
        });
        self
    }

    /// Set the priority weight used to break ties among eligible candidates
    /// in the same tier. Defaults to `1.0`.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Allow the transition to fire when the destination is the active state,
    /// re-running its exit and enter callbacks. Off by default.
    pub fn allow_reentry(mut self, allow: bool) -> Self {
        self.allow_reentry = allow;
        self
    }

    /// Attach a display name, used in diagrams and diagnostics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a lazy payload provider for the destination's context slot.
    ///
    /// The provider is installed when the transition commits and re-evaluated
    /// on every read of the slot. For a fixed destination the payload type is
    /// checked against the slot when the definition is finalized; dynamic
    /// destinations are checked at dispatch time instead.
    pub fn with_context<T, F>(mut self, provider: F) -> Self
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        let provider: Rc<dyn Fn() -> T> = Rc::new(provider);
        self.payload = Some(PayloadProvider {
            payload_type: TypeId::of::<T>(),
            payload_type_name: type_name::<T>(),
            install: Rc::new(move |slot: &mut dyn ContextSlot| {
                slot.install(Box::new(provider.clone()))
            }),
        });
        self
    }

    /// Finalize an unconditional transition. Alias for
    /// [`build`](TransitionBuilder::build).
    pub fn always(self) -> Result<(), BuildError> {
        self.build()
    }

    /// Validate the definition and add it to the machine.
    ///
    /// On error nothing is added: the machine's transition graph is exactly
    /// what it was before the builder was obtained.
    pub fn build(mut self) -> Result<(), BuildError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let target = self.target.take().ok_or(BuildError::MissingTarget {
            source: self.source_name,
        })?;

        if let (Some(payload), Target::Fixed(id)) = (&self.payload, &target) {
            let entry = self
                .machine
                .factory
                .entry_mut(*id)
                .expect("fixed targets are materialized by to()");
            match entry.instance.context_slot() {
                Some(slot) if slot.payload_type() == payload.payload_type => {}
                Some(slot) => {
                    return Err(BuildError::ContextTypeMismatch {
                        state: entry.name,
                        expected: slot.payload_type_name(),
                        declared: payload.payload_type_name,
                    });
                }
                None => {
                    return Err(BuildError::ContextTypeMismatch {
                        state: entry.name,
                        expected: "(no context slot)",
                        declared: payload.payload_type_name,
                    });
                }
            }
        }

        let existing = match &self.source {
            Source::Any => &self.machine.any_transitions,
            Source::State(id) => {
                &self
                    .machine
                    .factory
                    .entry(*id)
                    .expect("source entry is materialized by from()")
                    .transitions
            }
        };
        if existing
            .iter()
            .any(|t| Target::same_identity(&t.target, &target))
        {
            let target_display = match &target {
                Target::Fixed(_) => self.target_name.unwrap_or("?"),
                Target::Previous => "Previous",
                Target::Resolved(_) => "(dynamic)",
            };
            return Err(BuildError::DuplicateTransition {
                source: self.source_name,
                target: target_display.to_string(),
            });
        }

        let transition = Transition {
            target,
            target_name: self.target_name,
            guard: self.guard.take(),
            event: self.event,
            weight: self.weight,
            allow_reentry: self.allow_reentry,
            name: self.name.take(),
            payload: self.payload.take(),
        };
        match self.source {
            Source::Any => self.machine.any_transitions.push(transition),
            Source::State(id) => {
                self.machine
                    .factory
                    .entry_mut(id)
                    .expect("source entry is materialized by from()")
                    .transitions
                    .push(transition);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateContext;
    use crate::event_set;
    use crate::machine::machine::EventMachine;

    #[derive(Default)]
    struct A;
    impl MachineState for A {
        fn auto_create() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Default)]
    struct B;
    impl MachineState for B {
        fn auto_create() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Default)]
    struct Carrying {
        cargo: StateContext<u32>,
    }
    impl MachineState for Carrying {
        fn context_slot(&mut self) -> Option<&mut dyn ContextSlot> {
            Some(&mut self.cargo)
        }

        fn auto_create() -> Option<Self> {
            Some(Self::default())
        }
    }

    event_set! {
        pub enum TestEvent {
            Go,
        }
    }

    event_set! {
        pub enum OtherEvent {
            Elsewhere,
        }
    }

    #[test]
    fn missing_target_is_rejected() {
        let mut machine = Machine::new();
        let err = machine.from::<A>().when(|| true).build().unwrap_err();
        assert!(matches!(err, BuildError::MissingTarget { source: "A" }));
    }

    #[test]
    fn duplicate_source_event_target_is_rejected() {
        let mut machine = Machine::new();
        machine.from::<A>().to::<B>().build().unwrap();
        let err = machine.from::<A>().to::<B>().weight(9.0).build().unwrap_err();
        assert!(matches!(err, BuildError::DuplicateTransition { .. }));
    }

    #[test]
    fn duplicate_detection_ignores_the_event_binding() {
        let mut machine = EventMachine::<TestEvent>::new();
        machine.from::<A>().to::<B>().build().unwrap();
        let err = machine.from::<A>().to::<B>().on(TestEvent::Go).build().unwrap_err();
        assert!(matches!(err, BuildError::DuplicateTransition { .. }));
    }

    #[test]
    fn duplicate_previous_targets_are_rejected() {
        let mut machine = Machine::new();
        machine.from::<A>().to_previous().build().unwrap();
        let err = machine.from::<A>().to_previous().build().unwrap_err();
        assert!(matches!(err, BuildError::DuplicateTransition { .. }));
    }

    #[test]
    fn resolved_targets_never_collide() {
        let mut machine = Machine::new();
        machine
            .from::<A>()
            .to_resolved(|| Some(StateId::of::<B>()))
            .build()
            .unwrap();
        machine
            .from::<A>()
            .to_resolved(|| Some(StateId::of::<B>()))
            .build()
            .unwrap();
    }

    #[test]
    fn foreign_event_is_rejected_at_build() {
        let mut machine = EventMachine::<TestEvent>::new();
        let err = machine
            .from::<A>()
            .to::<B>()
            .on(OtherEvent::Elsewhere)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::EventDomainMismatch {
                domain: "TestEvent",
                event: "Elsewhere"
            }
        ));
    }

    #[test]
    fn payload_type_is_checked_against_fixed_target() {
        let mut machine = Machine::new();
        let err = machine
            .from::<A>()
            .to::<Carrying>()
            .with_context(|| "wrong".to_string())
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::ContextTypeMismatch { state: "Carrying", .. }));

        machine
            .from::<A>()
            .to::<Carrying>()
            .with_context(|| 7u32)
            .build()
            .unwrap();
    }

    #[test]
    fn payload_into_slotless_target_is_rejected() {
        let mut machine = Machine::new();
        let err = machine
            .from::<A>()
            .to::<B>()
            .with_context(|| 7u32)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::ContextTypeMismatch { state: "B", .. }));
    }

    #[test]
    fn failed_build_leaves_the_machine_untouched() {
        let mut machine = Machine::new();
        machine.from::<A>().build().unwrap_err();
        machine.set_initial::<A>().unwrap();
        // No half-built transition can fire.
        assert_eq!(machine.advance().unwrap(), crate::machine::machine::Step::Idled);
    }
}
