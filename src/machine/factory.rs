//! State factory: one cached instance per state type, with optional custom
//! constructors for dependency injection.

use crate::core::{short_type_name, MachineState, StateId};
use crate::machine::error::FactoryError;
use crate::machine::transition::Transition;
use std::collections::HashMap;

type Constructor = Box<dyn Fn() -> Option<Box<dyn MachineState>>>;

/// A cached state instance together with its identity and outgoing edges.
///
/// Transitions are co-located with the instance so that clearing the cache
/// discards the whole graph, mirroring states owning their transition lists.
pub(crate) struct StateEntry {
    pub(crate) name: &'static str,
    pub(crate) instance: Box<dyn MachineState>,
    pub(crate) transitions: Vec<Transition>,
}

impl std::fmt::Debug for StateEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateEntry")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}

/// Creates and caches one instance per state type.
///
/// Resolution order on a cache miss: a registered custom constructor, then
/// the type's [`auto_create`](MachineState::auto_create) fallback if
/// auto-create is enabled, otherwise [`FactoryError::UnregisteredType`].
///
/// # Example
///
/// ```rust
/// use flywheel::{Machine, MachineState, StateFactory};
///
/// struct Audio;
///
/// struct Attacking {
///     audio: Audio,
/// }
///
/// impl MachineState for Attacking {}
///
/// let mut factory = StateFactory::new();
/// factory.register(|| Some(Attacking { audio: Audio }));
///
/// let mut machine = Machine::with_factory(factory);
/// machine.set_initial::<Attacking>().unwrap();
/// ```
pub struct StateFactory {
    constructors: HashMap<StateId, Constructor>,
    cache: HashMap<StateId, StateEntry>,
    /// Creation order, for deterministic diagram export.
    order: Vec<StateId>,
    auto_create: bool,
}

impl Default for StateFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StateFactory {
    /// A factory with auto-create enabled.
    pub fn new() -> Self {
        Self::with_auto_create(true)
    }

    /// A factory with auto-create configured explicitly. With auto-create
    /// disabled, every state type must have a registered constructor.
    pub fn with_auto_create(auto_create: bool) -> Self {
        Self {
            constructors: HashMap::new(),
            cache: HashMap::new(),
            order: Vec::new(),
            auto_create,
        }
    }

    /// Register a custom constructor for `S`, replacing any prior one.
    ///
    /// The constructor returning `None` surfaces as
    /// [`FactoryError::Construction`] on the next creation attempt.
    pub fn register<S, F>(&mut self, constructor: F)
    where
        S: MachineState,
        F: Fn() -> Option<S> + 'static,
    {
        self.constructors.insert(
            StateId::of::<S>(),
            Box::new(move || {
                constructor().map(|s| Box::new(s) as Box<dyn MachineState>)
            }),
        );
    }

    /// Discard all cached instances and their transition lists. Registered
    /// constructors survive; used when rebuilding a machine at scene or
    /// session boundaries.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Number of cached instances.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Cached entry for `S`, creating it on first request.
    pub(crate) fn get_or_create<S: MachineState>(
        &mut self,
    ) -> Result<&mut StateEntry, FactoryError> {
        let id = StateId::of::<S>();
        if !self.cache.contains_key(&id) {
            let name = short_type_name::<S>();
            let instance = match self.constructors.get(&id) {
                Some(ctor) => ctor().ok_or(FactoryError::Construction { state: name })?,
                None if self.auto_create => S::auto_create()
                    .map(|s| Box::new(s) as Box<dyn MachineState>)
                    .ok_or(FactoryError::Construction { state: name })?,
                None => return Err(FactoryError::UnregisteredType { state: name }),
            };
            self.cache.insert(
                id,
                StateEntry {
                    name,
                    instance,
                    transitions: Vec::new(),
                },
            );
            self.order.push(id);
        }
        Ok(self
            .cache
            .get_mut(&id)
            .expect("entry inserted on the miss path above"))
    }

    pub(crate) fn entry(&self, id: StateId) -> Option<&StateEntry> {
        self.cache.get(&id)
    }

    pub(crate) fn entry_mut(&mut self, id: StateId) -> Option<&mut StateEntry> {
        self.cache.get_mut(&id)
    }

    /// Cached entries in creation order.
    pub(crate) fn ordered(&self) -> impl Iterator<Item = &StateEntry> {
        self.order.iter().filter_map(|id| self.cache.get(id))
    }
}
