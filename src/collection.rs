//! Provider lists used to bootstrap injectors.
//!
//! A [`Providers`] list is the set of `(token, provider)` pairs handed to
//! [`Injector::root`] or [`Injector::child`]. Later entries for the same token
//! replace earlier ones.
//!
//! [`Injector::root`]: crate::Injector::root
//! [`Injector::child`]: crate::Injector::child

use std::sync::Arc;

use crate::error::DiResult;
use crate::injector::Dependencies;
use crate::key::{Key, Token};
use crate::provider::Provider;
use crate::registration::Registration;
use crate::traits::Injectable;

/// Ordered list of providers for one scope.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Injector, Providers, Token};
///
/// let port = Token::<u16>::new("port");
/// let url = Token::<String>::new("url");
///
/// let mut providers = Providers::new();
/// providers
///     .value(&port, 5432)
///     .factory(&url, [port.key()], |deps| {
///         Ok(format!("postgres://localhost:{}", deps.at::<u16>(0)?))
///     });
///
/// let root = Injector::root(providers);
/// assert_eq!(*root.resolve(&url).unwrap(), "postgres://localhost:5432");
/// ```
#[derive(Default, Clone)]
pub struct Providers {
    entries: Vec<(Key, Registration)>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `provider` for `token`.
    pub fn provide<T: ?Sized>(&mut self, token: &Token<T>, provider: Provider<T>) -> &mut Self {
        self.entries.push((token.key(), provider.registration));
        self
    }

    /// Registers `T` as its own class provider under its type token.
    ///
    /// Shorthand for `provide(&Token::<T>::of(), Provider::class())`.
    pub fn class<T: Injectable>(&mut self) -> &mut Self {
        self.provide(&Token::<T>::of(), Provider::class())
    }

    /// Registers `T` as the class provider for a named token.
    pub fn class_as<T: Injectable>(&mut self, token: &Token<T>) -> &mut Self {
        self.provide(token, Provider::class())
    }

    /// Shares `value` as the instance of `token`.
    pub fn value<T: Send + Sync + 'static>(&mut self, token: &Token<T>, value: T) -> &mut Self {
        self.provide(token, Provider::value(value))
    }

    /// Shares an existing `Arc`, including trait objects.
    pub fn value_arc<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        token: &Token<T>,
        value: Arc<T>,
    ) -> &mut Self {
        self.provide(token, Provider::value_arc(value))
    }

    /// Produces the instance of `token` with `factory`, after resolving
    /// `deps` in order.
    pub fn factory<T, F>(
        &mut self,
        token: &Token<T>,
        deps: impl IntoIterator<Item = Key>,
        factory: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.provide(token, Provider::factory(deps, factory))
    }

    /// Makes `from` resolve to the same instance as `to`.
    pub fn alias<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        from: &Token<T>,
        to: &Token<T>,
    ) -> &mut Self {
        self.provide(from, Provider::alias(to))
    }

    /// Appends every entry of `other`. Entries of `other` win on conflicts.
    pub fn extend(&mut self, other: Providers) -> &mut Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(Key, Registration)> {
        self.entries
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(key, reg)| format!("{key} ({})", reg.kind)))
            .finish()
    }
}
