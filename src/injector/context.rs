//! Resolved dependencies handed to constructors and factories.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{DiError, DiResult};
use crate::key::{Key, Token};
use crate::registration::{downcast, AnyArc};

/// The resolved dependencies of one construction, in declared order.
///
/// Constructors never see the injector itself: everything they may use was
/// declared up front and resolved before they run.
///
/// # Examples
///
/// ```
/// use scoped_di::{Injector, Provider, Providers, Token};
///
/// let host = Token::<String>::new("host");
/// let port = Token::<u16>::new("port");
/// let url = Token::<String>::new("url");
///
/// let mut providers = Providers::new();
/// providers
///     .value(&host, "localhost".to_string())
///     .value(&port, 5432u16)
///     .provide(&url, Provider::factory([host.key(), port.key()], {
///         let port = port.clone();
///         move |deps| {
///             // By position or by token
///             let host = deps.at::<String>(0)?;
///             let port = deps.get(&port)?;
///             Ok(format!("postgres://{host}:{port}"))
///         }
///     }));
///
/// let root = Injector::root(providers);
/// assert_eq!(*root.resolve(&url).unwrap(), "postgres://localhost:5432");
/// ```
pub struct Dependencies {
    owner: Key,
    entries: SmallVec<[(Key, AnyArc); 4]>,
}

impl Dependencies {
    pub(crate) fn new(owner: Key, entries: SmallVec<[(Key, AnyArc); 4]>) -> Self {
        Self { owner, entries }
    }

    /// The resolved instance for `token`.
    ///
    /// Fails with [`DiError::UndeclaredDependency`] if `token` was not in the
    /// provider's dependency list.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> DiResult<Arc<T>> {
        let key = token.key_ref();
        let (_, instance) = self
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .ok_or_else(|| self.undeclared(key.label()))?;
        downcast::<T>(instance, key)
    }

    /// The resolved instance at declared position `index`.
    pub fn at<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let (key, instance) = self
            .entries
            .get(index)
            .ok_or_else(|| self.undeclared(&format!("#{index}")))?;
        downcast::<T>(instance, key)
    }

    /// Token being constructed.
    pub fn owner(&self) -> &Key {
        &self.owner
    }

    /// Declared dependency keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn undeclared(&self, dependency: &str) -> DiError {
        DiError::UndeclaredDependency {
            token: self.owner.label().to_string(),
            dependency: dependency.to_string(),
        }
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("owner", &self.owner)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
