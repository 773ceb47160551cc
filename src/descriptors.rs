//! Provider descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::provider::ProviderKind;
use crate::registration::{Recipe, Registration, Teardown};

/// Provider descriptor for introspection and diagnostics
///
/// Describes one registration of one scope: which token it satisfies, how,
/// and what it needs. Produced by [`Injector::descriptors`] and
/// [`Injector::lookup_local`].
///
/// [`Injector::descriptors`]: crate::Injector::descriptors
/// [`Injector::lookup_local`]: crate::Injector::lookup_local
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Dependencies, DiResult, Injectable, Injector, ProviderKind, Providers, Token};
///
/// struct TasksService;
/// impl Injectable for TasksService {
///     fn construct(_: &Dependencies) -> DiResult<Self> {
///         Ok(TasksService)
///     }
/// }
///
/// let tasks = Token::<TasksService>::new("tasks-service-token");
///
/// let mut providers = Providers::new();
/// providers.class::<TasksService>().alias(&tasks, &Token::of());
///
/// let root = Injector::root(providers);
/// let descriptors = root.descriptors();
///
/// assert_eq!(descriptors[0].kind, ProviderKind::Class);
/// assert!(descriptors[0].implementation.unwrap().ends_with("TasksService"));
///
/// assert_eq!(descriptors[1].token, tasks.key());
/// assert_eq!(descriptors[1].alias_target().unwrap(), &Token::<TasksService>::of().key());
/// ```
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    /// Token the provider satisfies
    pub token: Key,
    /// How it is satisfied
    pub kind: ProviderKind,
    /// Implementation type name for class providers
    pub implementation: Option<&'static str>,
    /// Dependency tokens in declared order; the alias target for aliases
    pub dependencies: Vec<Key>,
    /// Whether constructed instances register a teardown hook
    pub teardown: Option<TeardownKind>,
}

/// Flavor of teardown hook a provider registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownKind {
    Sync,
    Async,
}

impl ProviderDescriptor {
    pub(crate) fn new(key: &Key, registration: &Registration) -> Self {
        Self {
            token: key.clone(),
            kind: registration.kind,
            implementation: registration.impl_name,
            dependencies: registration.requirements().to_vec(),
            teardown: registration.teardown.as_ref().map(|t| match t {
                Teardown::Sync(_) => TeardownKind::Sync,
                Teardown::Async(_) => TeardownKind::Async,
            }),
        }
    }

    /// The redirected token, for alias providers.
    pub fn alias_target(&self) -> Option<&Key> {
        match self.kind {
            ProviderKind::Alias => self.dependencies.first(),
            _ => None,
        }
    }

    /// Label of the token the provider satisfies.
    pub fn label(&self) -> &str {
        self.token.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::erase;
    use std::sync::Arc;

    #[test]
    fn value_descriptor_has_no_dependencies() {
        let key = crate::Token::<u32>::new("port").key();
        let registration = Registration {
            kind: ProviderKind::Value,
            recipe: Recipe::Value(erase(Arc::new(80u32))),
            teardown: None,
            impl_name: None,
        };

        let descriptor = ProviderDescriptor::new(&key, &registration);
        assert_eq!(descriptor.label(), "port");
        assert!(descriptor.dependencies.is_empty());
        assert!(descriptor.alias_target().is_none());
        assert!(descriptor.teardown.is_none());
    }
}
