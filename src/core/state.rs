//! Core state trait and typed context slots.
//!
//! States are behavioral units with an enter/exit/tick lifecycle. Identity is
//! the concrete type: the factory caches one live instance per type, keyed by
//! [`StateId`].

use std::any::{type_name, Any, TypeId};
use std::rc::Rc;

/// Trait for state machine states.
///
/// All lifecycle callbacks default to no-ops, so a minimal state is a unit
/// struct with an empty impl. States that carry a typed payload expose their
/// slot through [`context_slot`](MachineState::context_slot); states that can
/// be built without injected dependencies provide
/// [`auto_create`](MachineState::auto_create).
///
/// # Example
///
/// ```rust
/// use flywheel::MachineState;
///
/// #[derive(Default)]
/// struct Idle {
///     ticks: u32,
/// }
///
/// impl MachineState for Idle {
///     fn on_tick(&mut self) {
///         self.ticks += 1;
///     }
///
///     fn auto_create() -> Option<Self> {
///         Some(Self::default())
///     }
/// }
/// ```
pub trait MachineState: Any {
    /// Invoked once when the state becomes active, before any tick.
    fn on_enter(&mut self) {}

    /// Invoked once when the state ceases to be active, before the
    /// successor's enter callback.
    fn on_exit(&mut self) {}

    /// Invoked once per pull evaluation while the state stays active. Never
    /// invoked during an evaluation in which a transition fires.
    fn on_tick(&mut self) {}

    /// Typed payload slot, if this is a typed-context state.
    ///
    /// The machine uses this to install or clear the payload provider when a
    /// transition into this state commits.
    fn context_slot(&mut self) -> Option<&mut dyn ContextSlot> {
        None
    }

    /// Fallback constructor used by the factory when no custom constructor is
    /// registered and auto-create is enabled.
    ///
    /// Returns `None` by default, meaning the type has no viable no-argument
    /// constructor. States that are `Default` typically forward to it:
    ///
    /// ```text
    /// fn auto_create() -> Option<Self> { Some(Self::default()) }
    /// ```
    fn auto_create() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// Copyable type token identifying a concrete state type.
///
/// Used as the factory's cache key and as the currency of dynamic target
/// resolvers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct StateId(TypeId);

impl StateId {
    /// The token for state type `S`.
    pub fn of<S: MachineState>() -> Self {
        StateId(TypeId::of::<S>())
    }
}

/// Last path segment of a type name, used as the state's display name.
pub(crate) fn short_type_name<S>() -> &'static str {
    let full = type_name::<S>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Object-safe access to a state's payload slot.
///
/// Implemented by [`StateContext`]; client code rarely touches this directly.
pub trait ContextSlot {
    /// `TypeId` of the payload type `T`.
    fn payload_type(&self) -> TypeId;

    /// Human-readable payload type name, for diagnostics.
    fn payload_type_name(&self) -> &'static str;

    /// Install a provider. The box must contain an `Rc<dyn Fn() -> T>` for
    /// the slot's payload type; returns `false` on a type mismatch and leaves
    /// the slot unchanged.
    fn install(&mut self, provider: Box<dyn Any>) -> bool;

    /// Drop the current provider, if any.
    fn clear(&mut self);
}

/// Typed payload slot for a state.
///
/// The slot holds a provider closure, not a snapshot: the payload is
/// re-evaluated on every read, so a provider that closes over mutable
/// application state always yields the current value. The provider is
/// installed by whichever transition most recently activated the state and
/// cleared again when a transition into the state carries no payload.
///
/// # Example
///
/// ```rust
/// use flywheel::{ContextSlot, MachineState, StateContext};
///
/// #[derive(Default)]
/// struct Aiming {
///     target: StateContext<(f32, f32)>,
/// }
///
/// impl MachineState for Aiming {
///     fn context_slot(&mut self) -> Option<&mut dyn ContextSlot> {
///         Some(&mut self.target)
///     }
///
///     fn auto_create() -> Option<Self> {
///         Some(Self::default())
///     }
/// }
/// ```
pub struct StateContext<T> {
    provider: Option<Rc<dyn Fn() -> T>>,
}

impl<T> Default for StateContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateContext<T> {
    /// An empty slot with no provider installed.
    pub fn new() -> Self {
        Self { provider: None }
    }

    /// Evaluate the provider, if one is installed.
    pub fn get(&self) -> Option<T> {
        self.provider.as_ref().map(|p| p())
    }

    /// Whether a provider is currently installed.
    pub fn is_set(&self) -> bool {
        self.provider.is_some()
    }
}

impl<T: Default> StateContext<T> {
    /// Evaluate the provider, falling back to `T::default()` when the slot is
    /// empty.
    pub fn get_or_default(&self) -> T {
        self.get().unwrap_or_default()
    }
}

impl<T: 'static> ContextSlot for StateContext<T> {
    fn payload_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn payload_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn install(&mut self, provider: Box<dyn Any>) -> bool {
        match provider.downcast::<Rc<dyn Fn() -> T>>() {
            Ok(p) => {
                self.provider = Some(*p);
                true
            }
            Err(_) => false,
        }
    }

    fn clear(&mut self) {
        self.provider = None;
    }
}
