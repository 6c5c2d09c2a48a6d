//! Guard predicates gating transition eligibility.
//!
//! Guards are nullary predicates, closures over application state supplied by
//! the client. The engine assumes they are cheap and side-effect-free; that is
//! a documented caller responsibility, not an enforced invariant.

/// Nullary predicate that determines whether a transition is eligible.
///
/// An absent guard on a transition means "always true". Guards compose with
/// short-circuit boolean combinators; each combinator wraps the previous
/// guard, so composition is order-dependent:
/// `when(a).and(b).or(c)` evaluates as `(a && b) || c`, while
/// `when(a).or(c).and(b)` evaluates as `(a || c) && b`.
///
/// # Example
///
/// ```rust
/// use flywheel::Guard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let grounded = Rc::new(Cell::new(true));
///
/// let g = grounded.clone();
/// let can_jump = Guard::new(move || g.get());
/// assert!(can_jump.check());
///
/// grounded.set(false);
/// assert!(!can_jump.check());
/// ```
pub struct Guard {
    predicate: Box<dyn Fn() -> bool>,
}

impl Guard {
    /// Create a guard from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self) -> bool {
        (self.predicate)()
    }

    /// Combine with another predicate via short-circuit conjunction.
    pub fn and<F>(self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard::new(move || (self.predicate)() && predicate())
    }

    /// Combine with another predicate via short-circuit disjunction.
    pub fn or<F>(self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard::new(move || (self.predicate)() || predicate())
    }
}
