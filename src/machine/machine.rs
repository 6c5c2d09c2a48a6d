//! Pull and push+pull machines and the priority-resolution dispatch.

use crate::builder::TransitionBuilder;
use crate::core::{
    Event, EventDomain, EventId, EventSet, MachineState, StateId, TraceRecord, TransitionTrace,
};
use crate::machine::error::{FactoryError, MachineError};
use crate::machine::factory::StateFactory;
use crate::machine::transition::{PayloadProvider, Target, Transition};
use chrono::Utc;
use std::any::Any;
use std::marker::PhantomData;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Outcome of a single evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// A transition fired and the active state changed.
    Transitioned {
        from: &'static str,
        to: &'static str,
    },
    /// Pull evaluation matched nothing; the active state ticked.
    Idled,
    /// A pushed event matched nothing and was dropped. Expected, not an
    /// error.
    Dropped(EventId),
}

/// A transition selected by the candidate scan, with everything the commit
/// step needs copied out of the immutable edge.
struct Firing {
    target: StateId,
    payload: Option<PayloadProvider>,
}

/// Pull-only state machine.
///
/// Owns the state cache, the wildcard transition list, and the
/// active/previous pointers. The host loop calls [`advance`](Machine::advance)
/// once per tick; at most one transition fires per call.
///
/// Single-threaded by contract: no locks are held and closures need not be
/// `Send`. Concurrent calls must be serialized by the caller.
///
/// # Example
///
/// ```rust
/// use flywheel::{Machine, MachineState};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Idle;
/// impl MachineState for Idle {
///     fn auto_create() -> Option<Self> { Some(Self::default()) }
/// }
///
/// #[derive(Default)]
/// struct Walk;
/// impl MachineState for Walk {
///     fn auto_create() -> Option<Self> { Some(Self::default()) }
/// }
///
/// let moving = Rc::new(Cell::new(false));
///
/// let mut machine = Machine::new();
/// let m = moving.clone();
/// machine.from::<Idle>().to::<Walk>().when(move || m.get()).build()?;
/// let m = moving.clone();
/// machine.from::<Walk>().to::<Idle>().when(move || !m.get()).build()?;
/// machine.set_initial::<Idle>()?;
///
/// moving.set(true);
/// machine.advance()?;
/// assert!(machine.current_is::<Walk>());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Machine {
    id: Uuid,
    pub(crate) factory: StateFactory,
    /// Wildcard ("any state") transitions, evaluated with strict priority
    /// over the active state's own.
    pub(crate) any_transitions: Vec<Transition>,
    pub(crate) event_domain: Option<EventDomain>,
    current: Option<StateId>,
    previous: Option<StateId>,
    trace: TransitionTrace,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// A machine with a fresh auto-creating factory.
    pub fn new() -> Self {
        Self::with_factory(StateFactory::new())
    }

    /// A machine using a pre-configured factory (e.g. with custom
    /// constructors registered).
    pub fn with_factory(factory: StateFactory) -> Self {
        Self::build(factory, None)
    }

    pub(crate) fn build(factory: StateFactory, event_domain: Option<EventDomain>) -> Self {
        Self {
            id: Uuid::new_v4(),
            factory,
            any_transitions: Vec::new(),
            event_domain,
            current: None,
            previous: None,
            trace: TransitionTrace::new(),
        }
    }

    /// Register a custom constructor for `S` on the owned factory.
    pub fn register<S, F>(&mut self, constructor: F)
    where
        S: MachineState,
        F: Fn() -> Option<S> + 'static,
    {
        self.factory.register(constructor);
    }

    /// Get or create the singleton instance of `S`, typed.
    ///
    /// Useful for configuring injected states or reading their fields in
    /// tests and host code.
    pub fn at<S: MachineState>(&mut self) -> Result<&mut S, FactoryError> {
        let entry = self.factory.get_or_create::<S>()?;
        let any: &mut dyn Any = entry.instance.as_mut();
        Ok(any
            .downcast_mut::<S>()
            .expect("cache entries are keyed by TypeId"))
    }

    /// Activate `S` without running transition resolution; only its enter
    /// callback runs.
    ///
    /// Calling this more than once, or after evaluation has begun, is a
    /// caller contract violation and is not separately enforced.
    pub fn set_initial<S: MachineState>(&mut self) -> Result<(), FactoryError> {
        let entry = self.factory.get_or_create::<S>()?;
        entry.instance.on_enter();
        self.current = Some(StateId::of::<S>());
        Ok(())
    }

    /// Start a transition from state `S`. Creates `S` on first use.
    pub fn from<S: MachineState>(&mut self) -> TransitionBuilder<'_> {
        TransitionBuilder::from_state::<S>(self)
    }

    /// Start a transition from the wildcard ("any state") source.
    ///
    /// Wildcard transitions preempt the active state's own transitions
    /// whenever one is eligible.
    pub fn from_any(&mut self) -> TransitionBuilder<'_> {
        TransitionBuilder::from_any(self)
    }

    /// Pull evaluation: run priority resolution with the pull sentinel.
    ///
    /// If nothing fires, the active state's tick callback runs instead.
    pub fn advance(&mut self) -> Result<Step, MachineError> {
        self.dispatch(EventId::NONE)
    }

    /// Whether the active state is `S`.
    pub fn current_is<S: MachineState>(&self) -> bool {
        self.current == Some(StateId::of::<S>())
    }

    /// Display name of the active state, if any.
    pub fn current_name(&self) -> Option<&'static str> {
        let id = self.current?;
        self.factory.entry(id).map(|e| e.name)
    }

    /// Display name of the previously active state, if any.
    pub fn previous_name(&self) -> Option<&'static str> {
        let id = self.previous?;
        self.factory.entry(id).map(|e| e.name)
    }

    /// The committed-transition trace.
    pub fn trace(&self) -> &TransitionTrace {
        &self.trace
    }

    /// Discard cached state instances, the transition graph, the
    /// active/previous pointers, and the trace. Registered constructors
    /// survive; used when rebuilding the machine at scene or session
    /// boundaries.
    pub fn reset(&mut self) {
        self.factory.clear_cache();
        self.any_transitions.clear();
        self.current = None;
        self.previous = None;
        self.trace.clear();
        debug!(machine = %self.id, "machine reset");
    }

    /// Run the two-tier priority resolution for `trigger` and commit at most
    /// one transition.
    pub(crate) fn dispatch(&mut self, trigger: EventId) -> Result<Step, MachineError> {
        let current = self.current.ok_or(MachineError::NotInitialized)?;

        // Tier 1: a wildcard candidate short-circuits the active state's own
        // transitions entirely, regardless of their weights.
        let firing = Self::select(&self.any_transitions, trigger, current, self.previous)
            .or_else(|| {
                self.factory
                    .entry(current)
                    .and_then(|e| Self::select(&e.transitions, trigger, current, self.previous))
            });

        match firing {
            Some(firing) => Ok(self.commit(current, firing, trigger)),
            None if trigger == EventId::NONE => {
                if let Some(entry) = self.factory.entry_mut(current) {
                    entry.instance.on_tick();
                }
                Ok(Step::Idled)
            }
            None => {
                trace!(machine = %self.id, event = ?trigger, "event matched no transition; dropped");
                Ok(Step::Dropped(trigger))
            }
        }
    }

    /// Scan one transition list in registration order. The strictly greatest
    /// weight wins; on ties the first-registered candidate is kept, because
    /// the scan only replaces on a strictly greater weight.
    fn select(
        transitions: &[Transition],
        trigger: EventId,
        current: StateId,
        previous: Option<StateId>,
    ) -> Option<Firing> {
        let mut best: Option<(f64, Firing)> = None;
        for transition in transitions {
            if !transition.matches(trigger) {
                continue;
            }
            let target = match &transition.target {
                Target::Fixed(id) => Some(*id),
                Target::Previous => previous,
                Target::Resolved(resolve) => resolve(),
            };
            let Some(target) = target else {
                trace!("dynamic target did not resolve; transition skipped");
                continue;
            };
            if target == current && !transition.allow_reentry {
                continue;
            }
            let replace = match &best {
                None => true,
                Some((weight, _)) => transition.weight > *weight,
            };
            if replace {
                best = Some((
                    transition.weight,
                    Firing {
                        target,
                        payload: transition.payload.clone(),
                    },
                ));
            }
        }
        best.map(|(_, firing)| firing)
    }

    /// Commit one selected transition: install or clear the destination's
    /// payload provider, exit the old state, move the pointers, enter the
    /// new state.
    fn commit(&mut self, from: StateId, firing: Firing, trigger: EventId) -> Step {
        if let Some(entry) = self.factory.entry_mut(firing.target) {
            match entry.instance.context_slot() {
                Some(slot) => match &firing.payload {
                    Some(payload) => {
                        if !(payload.install)(slot) {
                            warn!(
                                machine = %self.id,
                                found = payload.payload_type_name,
                                "payload type rejected by destination slot; context cleared"
                            );
                            slot.clear();
                        }
                    }
                    None => slot.clear(),
                },
                None => {
                    if firing.payload.is_some() {
                        warn!(
                            machine = %self.id,
                            "transition carries a payload but the destination has no context slot"
                        );
                    }
                }
            }
        }

        let from_name = self.factory.entry(from).map_or("?", |e| e.name);
        let to_name = self.factory.entry(firing.target).map_or("?", |e| e.name);

        if let Some(entry) = self.factory.entry_mut(from) {
            entry.instance.on_exit();
        }
        self.previous = Some(from);
        self.current = Some(firing.target);
        self.trace.record(TraceRecord {
            from: from_name.to_string(),
            to: to_name.to_string(),
            event: (trigger != EventId::NONE).then_some(trigger),
            timestamp: Utc::now(),
        });
        if let Some(entry) = self.factory.entry_mut(firing.target) {
            entry.instance.on_enter();
        }

        debug!(machine = %self.id, from = from_name, to = to_name, "transition fired");
        Step::Transitioned {
            from: from_name,
            to: to_name,
        }
    }
}

/// Push+pull state machine bound to the closed event domain `E`.
///
/// Adds [`fire`](EventMachine::fire) on top of the pull machine; every fired
/// event and every `on(...)` binding is validated against `E`.
///
/// # Example
///
/// ```rust
/// use flywheel::{event_set, EventMachine, MachineState};
///
/// #[derive(Default)]
/// struct Closed;
/// impl MachineState for Closed {
///     fn auto_create() -> Option<Self> { Some(Self::default()) }
/// }
///
/// #[derive(Default)]
/// struct Open;
/// impl MachineState for Open {
///     fn auto_create() -> Option<Self> { Some(Self::default()) }
/// }
///
/// event_set! {
///     pub enum DoorEvent {
///         Knock,
///         Slam,
///     }
/// }
///
/// let mut door = EventMachine::<DoorEvent>::new();
/// door.from::<Closed>().to::<Open>().on(DoorEvent::Knock).always()?;
/// door.from::<Open>().to::<Closed>().on(DoorEvent::Slam).always()?;
/// door.set_initial::<Closed>()?;
///
/// door.fire(DoorEvent::Knock)?;
/// assert!(door.current_is::<Open>());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EventMachine<E: EventSet> {
    inner: Machine,
    _events: PhantomData<E>,
}

impl<E: EventSet> Default for EventMachine<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventSet> EventMachine<E> {
    /// A push+pull machine with a fresh auto-creating factory.
    pub fn new() -> Self {
        Self::with_factory(StateFactory::new())
    }

    /// A push+pull machine using a pre-configured factory.
    pub fn with_factory(factory: StateFactory) -> Self {
        Self {
            inner: Machine::build(factory, Some(EventDomain::of::<E>())),
            _events: PhantomData,
        }
    }

    /// Push evaluation: run priority resolution for a discrete event.
    ///
    /// Fails fast with [`MachineError::EventDomainMismatch`] when the event
    /// does not belong to `E`; the active state is left unchanged. An event
    /// that matches no transition is dropped silently
    /// ([`Step::Dropped`]).
    pub fn fire(&mut self, event: impl Event) -> Result<Step, MachineError> {
        let id = event.id();
        if !E::contains(id) {
            return Err(MachineError::EventDomainMismatch {
                domain: E::domain_name(),
                event: event.name(),
                id,
            });
        }
        self.inner.dispatch(id)
    }

    /// Register a custom constructor for `S` on the owned factory.
    pub fn register<S, F>(&mut self, constructor: F)
    where
        S: MachineState,
        F: Fn() -> Option<S> + 'static,
    {
        self.inner.register(constructor);
    }

    /// Get or create the singleton instance of `S`, typed.
    pub fn at<S: MachineState>(&mut self) -> Result<&mut S, FactoryError> {
        self.inner.at::<S>()
    }

    /// Activate `S` without running transition resolution.
    pub fn set_initial<S: MachineState>(&mut self) -> Result<(), FactoryError> {
        self.inner.set_initial::<S>()
    }

    /// Start a transition from state `S`.
    pub fn from<S: MachineState>(&mut self) -> TransitionBuilder<'_> {
        self.inner.from::<S>()
    }

    /// Start a transition from the wildcard ("any state") source.
    pub fn from_any(&mut self) -> TransitionBuilder<'_> {
        self.inner.from_any()
    }

    /// Pull evaluation, identical to the pull machine's.
    pub fn advance(&mut self) -> Result<Step, MachineError> {
        self.inner.advance()
    }

    /// Whether the active state is `S`.
    pub fn current_is<S: MachineState>(&self) -> bool {
        self.inner.current_is::<S>()
    }

    /// Display name of the active state, if any.
    pub fn current_name(&self) -> Option<&'static str> {
        self.inner.current_name()
    }

    /// Display name of the previously active state, if any.
    pub fn previous_name(&self) -> Option<&'static str> {
        self.inner.previous_name()
    }

    /// The committed-transition trace.
    pub fn trace(&self) -> &TransitionTrace {
        self.inner.trace()
    }

    /// Deterministic textual rendering of the transition graph.
    pub fn diagram(&self) -> String {
        self.inner.diagram()
    }

    /// Discard cached states, the graph, the pointers, and the trace.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
