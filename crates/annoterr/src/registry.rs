//! Error-type registry: name ↔ [`ErrorType`] mapping.
//!
//! ```text
//! register("NetworkFail")
//!       │
//!       ▼  read lock: index.get(name)      ── hit ──▶ existing id
//!       │ miss
//!       ▼  write lock: index.get(name) again ── hit ──▶ id another caller just made
//!       │ miss
//!       ▼  names.push(name), id = names.len() - 1
//! ```
//!
//! Appends happen only under the write lock, so every name gets exactly one
//! id even when the same new name is registered from many threads at once.
//! Lookups of already-issued ids share the read lock.
//!
//! The process-wide instance ([`global`]) is built lazily, with the nine
//! built-in types, the first time anything touches it. The built-in
//! `ErrorType` constants are plain integers; every name lookup goes through
//! `global()`, which forces that initialization first.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::ErrorType;

/// Misuse of an [`ErrorType`] against a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The id was never issued by the registry it was looked up in.
    #[error("error type #{id} was never registered ({registered} types known)")]
    UnknownType { id: u32, registered: usize },
}

/// Deduplicating, append-only table of error-type names.
///
/// Use [`global`] for the process-wide instance. Separate instances are
/// useful for tests or for a component that wants its own namespace; ids
/// from one instance mean nothing to another.
pub struct TypeRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Index = id.
    names: Vec<Arc<str>>,
    index: HashMap<Arc<str>, ErrorType>,
}

impl TypeRegistry {
    /// Empty registry, without the built-ins.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Registry holding the nine built-in types at their fixed ids.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for (expected, name) in ErrorType::BUILTINS {
            let t = registry.register(name);
            debug_assert_eq!(t.id(), expected.id(), "built-in {name} registered out of order");
        }
        registry
    }

    /// Return the id for `name`, registering it first if it is new.
    ///
    /// Idempotent: the same name always yields the same id. Never fails.
    pub fn register(&self, name: &str) -> ErrorType {
        if let Some(t) = self.lookup(name) {
            return t;
        }

        let mut inner = self.write();
        // Another caller may have appended it between the two locks.
        if let Some(&t) = inner.index.get(name) {
            return t;
        }

        let id = u32::try_from(inner.names.len())
            .unwrap_or_else(|_| panic!("error type registry exhausted the u32 id space"));
        let t = ErrorType::from_raw(id);
        let name: Arc<str> = Arc::from(name);
        inner.names.push(Arc::clone(&name));
        inner.index.insert(Arc::clone(&name), t);
        drop(inner);

        tracing::debug!(name = %name, id, "registered error type");
        t
    }

    /// Id for `name` if it has been registered. Never registers.
    pub fn lookup(&self, name: &str) -> Option<ErrorType> {
        self.read().index.get(name).copied()
    }

    /// The exact name `t` was registered under.
    ///
    /// # Panics
    ///
    /// If `t` was never issued by this registry. That is a caller bug
    /// (a hand-built id, or one from another registry), not a runtime
    /// condition; use [`try_name_of`](Self::try_name_of) to get an error
    /// instead.
    pub fn name_of(&self, t: ErrorType) -> Arc<str> {
        match self.try_name_of(t) {
            Ok(name) => name,
            Err(e) => panic!("{e}"),
        }
    }

    /// Non-panicking [`name_of`](Self::name_of).
    pub fn try_name_of(&self, t: ErrorType) -> Result<Arc<str>, RegistryError> {
        let inner = self.read();
        inner
            .names
            .get(t.index())
            .cloned()
            .ok_or(RegistryError::UnknownType {
                id: t.id(),
                registered: inner.names.len(),
            })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all names, index = id.
    pub fn names(&self) -> Vec<Arc<str>> {
        self.read().names.clone()
    }

    // Every critical section is a lookup or a push + insert; a panic in
    // another thread cannot leave `Inner` half-updated, so poisoning is
    // ignored.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.read().names)
            .finish()
    }
}

// ── Process-wide instance ─────────────────────────────────────────

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::with_builtins);

/// The process-wide registry, pre-populated with the built-in types.
pub fn global() -> &'static TypeRegistry {
    &GLOBAL
}

/// Register `name` in the process-wide registry.
///
/// ```
/// let network_fail = annoterr::register("NetworkFail");
/// assert_eq!(annoterr::register("NetworkFail"), network_fail);
/// assert_eq!(&*network_fail.name(), "NetworkFail");
/// ```
pub fn register(name: &str) -> ErrorType {
    global().register(name)
}
