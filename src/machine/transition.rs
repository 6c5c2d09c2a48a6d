//! The transition edge: target resolution, guard, event binding, weight,
//! reentry flag, and payload provider.

use crate::core::{ContextSlot, Guard, StateId};
use crate::core::EventId;
use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

/// Where a transition leads.
///
/// `Previous` and `Resolved` are evaluated at dispatch time, not at build
/// time: "back to the previous state" must track whatever the history pointer
/// holds when the transition is considered.
pub enum Target {
    /// A fixed destination state.
    Fixed(StateId),
    /// The machine's previous active state ("back").
    Previous,
    /// An arbitrary dynamic resolver. `None` means "no destination right
    /// now"; the transition is skipped silently.
    Resolved(Box<dyn Fn() -> Option<StateId>>),
}

impl Target {
    /// Whether two targets have the same static identity, for duplicate
    /// rejection. Resolver closures have no static identity and never
    /// compare equal.
    pub(crate) fn same_identity(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Fixed(a), Target::Fixed(b)) => a == b,
            (Target::Previous, Target::Previous) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Fixed(id) => f.debug_tuple("Fixed").field(id).finish(),
            Target::Previous => write!(f, "Previous"),
            Target::Resolved(_) => write!(f, "Resolved(..)"),
        }
    }
}

/// Type-tagged payload installer carried by a transition.
///
/// The provider itself lives behind an `Rc` so the immutable transition can
/// install a fresh handle into the destination slot on every firing.
#[derive(Clone)]
pub(crate) struct PayloadProvider {
    pub(crate) payload_type: TypeId,
    pub(crate) payload_type_name: &'static str,
    pub(crate) install: Rc<dyn Fn(&mut dyn ContextSlot) -> bool>,
}

impl fmt::Debug for PayloadProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadProvider")
            .field("payload_type", &self.payload_type_name)
            .finish()
    }
}

/// A directed, guarded, weighted edge between states.
///
/// Immutable once registered on its source; there is no mutation or removal
/// API. Created exclusively by the builder's finalize step.
pub struct Transition {
    pub(crate) target: Target,
    /// Display name of a fixed target, captured at build time for diagram
    /// export. `None` for dynamic targets.
    pub(crate) target_name: Option<&'static str>,
    pub(crate) guard: Option<Guard>,
    /// `EventId::NONE` means pull-only.
    pub(crate) event: EventId,
    pub(crate) weight: f64,
    pub(crate) allow_reentry: bool,
    pub(crate) name: Option<String>,
    pub(crate) payload: Option<PayloadProvider>,
}

impl Transition {
    /// Whether this transition matches the trigger and its guard passes.
    /// Target resolution and reentry filtering happen in the dispatch scan.
    pub(crate) fn matches(&self, trigger: EventId) -> bool {
        self.event == trigger && self.guard.as_ref().is_none_or(|g| g.check())
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("event", &self.event)
            .field("weight", &self.weight)
            .field("allow_reentry", &self.allow_reentry)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MachineState;

    struct A;
    impl MachineState for A {}

    struct B;
    impl MachineState for B {}

    fn bare(target: Target) -> Transition {
        Transition {
            target,
            target_name: None,
            guard: None,
            event: EventId::NONE,
            weight: 1.0,
            allow_reentry: false,
            name: None,
            payload: None,
        }
    }

    #[test]
    fn fixed_targets_compare_by_state_id() {
        let a = Target::Fixed(StateId::of::<A>());
        let a2 = Target::Fixed(StateId::of::<A>());
        let b = Target::Fixed(StateId::of::<B>());

        assert!(a.same_identity(&a2));
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn previous_targets_share_identity() {
        assert!(Target::Previous.same_identity(&Target::Previous));
        assert!(!Target::Previous.same_identity(&Target::Fixed(StateId::of::<A>())));
    }

    #[test]
    fn resolvers_never_compare_equal() {
        let r1 = Target::Resolved(Box::new(|| None));
        let r2 = Target::Resolved(Box::new(|| None));
        assert!(!r1.same_identity(&r2));
    }

    #[test]
    fn matches_requires_the_exact_trigger() {
        let t = bare(Target::Fixed(StateId::of::<A>()));
        assert!(t.matches(EventId::NONE));
        assert!(!t.matches(EventId::of("Cmd::Go")));

        let mut t = bare(Target::Fixed(StateId::of::<A>()));
        t.event = EventId::of("Cmd::Go");
        assert!(t.matches(EventId::of("Cmd::Go")));
        assert!(!t.matches(EventId::NONE));
    }

    #[test]
    fn matches_respects_the_guard() {
        let mut t = bare(Target::Fixed(StateId::of::<A>()));
        t.guard = Some(Guard::new(|| false));
        assert!(!t.matches(EventId::NONE));

        t.guard = Some(Guard::new(|| true));
        assert!(t.matches(EventId::NONE));
    }
}
