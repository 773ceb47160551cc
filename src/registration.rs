//! Provider registration types.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::injector::Dependencies;
use crate::internal::{BoxFutureUnit, FastMap};
use crate::key::Key;
use crate::provider::ProviderKind;

/// Type-erased instance as stored in a scope's cache.
///
/// An instance resolved through a `Token<T>` is stored as `Arc<Arc<T>>`
/// erased to `Arc<dyn Any>`, which lets `T` be a trait object.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type ConstructFn = Arc<dyn Fn(&Dependencies) -> DiResult<AnyArc> + Send + Sync>;
pub(crate) type SyncTeardownFn =
    Arc<dyn Fn(&AnyArc) -> Option<Box<dyn FnOnce() + Send>> + Send + Sync>;
pub(crate) type AsyncTeardownFn =
    Arc<dyn Fn(&AnyArc) -> Option<Box<dyn FnOnce() -> BoxFutureUnit + Send>> + Send + Sync>;

/// How a registration produces its instance
#[derive(Clone)]
pub(crate) enum Recipe {
    /// Resolve `deps` in order, then call `ctor` with them
    Construct { deps: Arc<[Key]>, ctor: ConstructFn },
    /// Pre-built instance
    Value(AnyArc),
    /// Forward to another key
    Alias(Key),
}

/// Hook turning a freshly constructed instance into a teardown action
#[derive(Clone)]
pub(crate) enum Teardown {
    Sync(SyncTeardownFn),
    Async(AsyncTeardownFn),
}

/// Provider registration in one scope's registry
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) kind: ProviderKind,
    pub(crate) recipe: Recipe,
    pub(crate) teardown: Option<Teardown>,
    /// Implementation type name for diagnostics
    pub(crate) impl_name: Option<&'static str>,
}

impl Registration {
    /// Dependency keys the recipe needs before it can produce an instance.
    pub(crate) fn requirements(&self) -> &[Key] {
        match &self.recipe {
            Recipe::Construct { deps, .. } => &deps[..],
            Recipe::Alias(target) => std::slice::from_ref(target),
            Recipe::Value(_) => &[],
        }
    }
}

/// Token → provider mapping of one scope.
///
/// Registration order is kept for introspection; re-registering a key
/// replaces the provider in place.
#[derive(Default)]
pub(crate) struct Registry {
    entries: FastMap<Key, Registration>,
    order: Vec<Key>,
}

impl Registry {
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) -> Option<Registration> {
        let previous = self.entries.insert(key.clone(), registration);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        self.entries.get(key)
    }

    /// Iterator over all key-registration pairs in registration order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.order
            .iter()
            .filter_map(move |key| self.entries.get(key).map(|reg| (key, reg)))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Erases a shared instance for storage.
#[inline]
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> AnyArc {
    Arc::new(instance)
}

/// Recovers the `Arc<T>` stored under `key`.
pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(
    instance: &AnyArc,
    key: &Key,
) -> DiResult<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| DiError::type_mismatch(key, type_name::<T>()))
}
