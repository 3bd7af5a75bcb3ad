//! Container checker registry.
//!
//! Maps a nominal origin ([`TypeKey`]) to the routine that validates the
//! elements of its instances. The process-wide registry is seeded with the
//! builtin checkers and is meant to be extended during initialisation only.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard};
use rttc_types::{Builtin, Chain, CheckOutcome, Descriptor, TypeKey, Value, Walk};

use crate::builtins;

/// Element-wise checker for a container origin. Receives the container,
/// the descriptor's type arguments and the chain at the container.
pub type ContainerCheckFn = fn(&dyn Walk, &Value, &[Descriptor], &Chain<'_>) -> CheckOutcome;

static GLOBAL_REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

/// Registry of container checkers.
#[derive(Clone, Default)]
pub struct Registry {
    checkers: HashMap<TypeKey, ContainerCheckFn>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.checkers.keys()).finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all builtin container checkers.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(Builtin::List, builtins::check_sequence);
        reg.register(Builtin::Tuple, builtins::check_sequence);
        reg.register(Builtin::Sequence, builtins::check_sequence);
        reg.register(Builtin::Set, builtins::check_set);
        reg.register(Builtin::Dict, builtins::check_mapping);
        reg.register(Builtin::Iterable, builtins::refuse_opaque);
        reg.register(Builtin::FrozenSet, builtins::refuse_opaque);
        reg
    }

    /// Register (or replace) the checker for `origin`.
    pub fn register(&mut self, origin: impl Into<TypeKey>, checker: ContainerCheckFn) {
        self.checkers.insert(origin.into(), checker);
    }

    /// Look up the checker for `origin`.
    pub fn get(&self, origin: &TypeKey) -> Option<ContainerCheckFn> {
        self.checkers.get(origin).copied()
    }

    pub fn contains(&self, origin: &TypeKey) -> bool {
        self.checkers.contains_key(origin)
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

fn global() -> &'static RwLock<Registry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(Registry::with_builtins()))
}

/// Read access to the process-wide registry. Held for the duration of a
/// top-level check; registering from inside a checker deadlocks.
pub fn global_registry() -> RwLockReadGuard<'static, Registry> {
    global().read_recursive()
}

/// Register a container checker process-wide.
pub fn register_container_checker(origin: impl Into<TypeKey>, checker: ContainerCheckFn) {
    let origin = origin.into();
    tracing::debug!(?origin, "registering container checker");
    global().write().register(origin, checker);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let reg = Registry::with_builtins();
        assert_eq!(reg.len(), 7);
        for kind in [Builtin::List, Builtin::Tuple, Builtin::Set, Builtin::Dict] {
            assert!(reg.contains(&kind.into()), "missing checker for {kind:?}");
        }
        assert!(!reg.contains(&Builtin::Int.into()));
    }

    #[test]
    fn test_empty_registry() {
        let reg = Registry::new();
        assert!(reg.is_empty());
        assert!(reg.get(&Builtin::List.into()).is_none());
    }

    #[test]
    fn test_register_replaces() {
        fn accept(_: &dyn Walk, _: &Value, _: &[Descriptor], _: &Chain<'_>) -> CheckOutcome {
            Ok(())
        }
        let mut reg = Registry::with_builtins();
        reg.register(Builtin::Set, accept);
        assert_eq!(reg.len(), 7);
        let checker = reg.get(&Builtin::Set.into()).unwrap();
        assert!(checker as usize == accept as usize);
    }
}
