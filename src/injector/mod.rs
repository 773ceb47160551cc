//! Injector hierarchy.
//!
//! An [`Injector`] is one scope: it owns a provider registry, an instance
//! cache, and the teardown hooks of the instances it constructed, and it links
//! to its parent. The root injector is created from the application's provider
//! list; child injectors (one per component subtree, request, or test) add
//! overriding providers on top.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::collection::Providers;
use crate::config::InjectorConfig;
use crate::descriptors::ProviderDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::{InstanceCache, ResolutionPath};
use crate::key::{Key, Token};
use crate::provider::Provider;
use crate::registration::{downcast, AnyArc, Registration, Registry};

mod context;
mod resolve;
mod teardown;

pub use context::Dependencies;
use teardown::TeardownQueue;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// A scope in the injector hierarchy.
///
/// `Injector` is a cheap handle: clones refer to the same scope. Resolving a
/// token walks from this scope toward the root and uses the nearest provider;
/// the instance is constructed once and cached in the scope that owns that
/// provider.
///
/// # Examples
///
/// ```
/// use scoped_di::{Dependencies, DiResult, Injectable, Injector, Provider, Providers, Token};
/// use std::sync::Arc;
///
/// struct TasksService {
///     source: &'static str,
/// }
///
/// impl Injectable for TasksService {
///     fn construct(_: &Dependencies) -> DiResult<Self> {
///         Ok(TasksService { source: "real" })
///     }
/// }
///
/// let tasks = Token::<TasksService>::new("tasks-service-token");
///
/// let mut providers = Providers::new();
/// providers.class_as(&tasks);
/// let root = Injector::root(providers);
///
/// let mut overrides = Providers::new();
/// overrides.value(&tasks, TasksService { source: "mock" });
/// let child = root.create_child(overrides).unwrap();
///
/// assert_eq!(child.resolve(&tasks).unwrap().source, "mock");
/// assert_eq!(root.resolve(&tasks).unwrap().source, "real");
///
/// // Singleton per scope
/// assert!(Arc::ptr_eq(&root.resolve(&tasks).unwrap(), &root.resolve(&tasks).unwrap()));
///
/// child.destroy().unwrap();
/// root.destroy().unwrap();
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

pub(crate) struct InjectorInner {
    id: u64,
    depth: usize,
    parent: Option<Injector>,
    config: Arc<InjectorConfig>,
    registry: RwLock<Registry>,
    cache: InstanceCache,
    teardown: Mutex<TeardownQueue>,
    children: Mutex<Vec<Weak<InjectorInner>>>,
    destroyed: AtomicBool,
}

impl Injector {
    /// Creates the root injector with default configuration.
    pub fn root(providers: Providers) -> Self {
        Self::root_with_config(providers, InjectorConfig::default())
    }

    /// Creates the root injector with explicit configuration.
    ///
    /// The configuration applies to every child created below this root.
    pub fn root_with_config(providers: Providers, config: InjectorConfig) -> Self {
        let injector = Self::new_scope(None, providers, Arc::new(config));
        debug!(
            scope = injector.id(),
            providers = injector.inner.registry.read().len(),
            "Created root injector"
        );
        injector
    }

    /// Creates a child scope of `parent` with the given overriding providers.
    ///
    /// The child starts with only `providers`; everything else stays
    /// reachable through the parent link.
    pub fn child(parent: &Injector, providers: Providers) -> DiResult<Self> {
        // Hold the children lock so a concurrent destroy cannot slip between
        // the liveness check and the registration of the new child.
        let mut children = parent.inner.children.lock();
        parent.ensure_live()?;

        let child = Self::new_scope(Some(parent.clone()), providers, parent.inner.config.clone());
        children.retain(|weak| weak.strong_count() > 0);
        children.push(Arc::downgrade(&child.inner));

        debug!(
            scope = child.id(),
            parent = parent.id(),
            depth = child.depth(),
            providers = child.inner.registry.read().len(),
            "Created child injector"
        );
        Ok(child)
    }

    /// Creates a child scope of this injector. See [`Injector::child`].
    pub fn create_child(&self, providers: Providers) -> DiResult<Self> {
        Self::child(self, providers)
    }

    fn new_scope(
        parent: Option<Injector>,
        providers: Providers,
        config: Arc<InjectorConfig>,
    ) -> Self {
        let mut registry = Registry::default();
        for (key, registration) in providers.into_entries() {
            registry.insert(key, registration);
        }

        Injector {
            inner: Arc::new(InjectorInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                depth: parent.as_ref().map_or(0, |p| p.depth() + 1),
                parent,
                config,
                registry: RwLock::new(registry),
                cache: InstanceCache::default(),
                teardown: Mutex::new(TeardownQueue::default()),
                children: Mutex::new(Vec::new()),
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    // ----- Registration -----

    /// Registers or replaces the provider for `token` in this scope only.
    ///
    /// Ancestors are never touched. With
    /// [`reject_late_registration`](InjectorConfig::reject_late_registration)
    /// set (the default), registering a token this scope has already
    /// resolved and cached fails with [`DiError::InvalidScope`]; providers
    /// are meant to be in place before first resolution.
    pub fn register<T: ?Sized>(&self, token: &Token<T>, provider: Provider<T>) -> DiResult<()> {
        self.register_key(token.key(), provider.registration)
    }

    pub(crate) fn register_key(&self, key: Key, registration: Registration) -> DiResult<()> {
        self.ensure_live()?;

        // One write guard over check and insert: lookups blocked behind it
        // find the new provider
        let mut registry = self.inner.registry.write();
        if self.inner.config.reject_late_registration && self.inner.cache.contains(&key) {
            return Err(DiError::invalid_scope(
                self.describe(),
                format!("{} was already resolved in this scope", key.label()),
            ));
        }

        let kind = registration.kind;
        let replaced = registry.insert(key.clone(), registration).is_some();
        drop(registry);
        debug!(scope = self.id(), token = %key, %kind, replaced, "Registered provider");
        Ok(())
    }

    /// The provider registered for `key` in this scope, without consulting
    /// ancestors.
    pub fn lookup_local(&self, key: &Key) -> Option<ProviderDescriptor> {
        self.inner
            .registry
            .read()
            .get(key)
            .map(|reg| ProviderDescriptor::new(key, reg))
    }

    pub(crate) fn local_registration(&self, key: &Key) -> Option<Registration> {
        self.inner.registry.read().get(key).cloned()
    }

    /// Descriptors of every provider registered in this scope, in
    /// registration order.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.inner
            .registry
            .read()
            .iter()
            .map(|(key, reg)| ProviderDescriptor::new(key, reg))
            .collect()
    }

    pub(crate) fn local_keys(&self) -> Vec<Key> {
        self.inner.registry.read().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Returns `true` if `token` has a provider in this scope or an ancestor.
    pub fn contains<T: ?Sized>(&self, token: &Token<T>) -> bool {
        self.find_provider(token.key_ref()).is_some()
    }

    // ----- Resolution -----

    /// Resolves `token` to its instance.
    ///
    /// Fails with [`DiError::Unsatisfied`] when no scope in the chain
    /// provides the token (or one of its transitive dependencies),
    /// [`DiError::Cyclic`] when the dependency graph loops, and
    /// [`DiError::InvalidScope`] when this injector was destroyed.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> DiResult<Arc<T>> {
        let instance = self.resolve_key(token.key_ref())?;
        downcast::<T>(&instance, token.key_ref())
    }

    /// Like [`resolve`](Injector::resolve), but a missing provider for
    /// `token` itself yields `Ok(None)`.
    ///
    /// A missing provider further down the dependency chain is still an
    /// error: the token was provided, just misconfigured.
    pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
        token: &Token<T>,
    ) -> DiResult<Option<Arc<T>>> {
        match self.resolve(token) {
            Ok(instance) => Ok(Some(instance)),
            Err(DiError::Unsatisfied { required_by, .. }) if required_by.is_empty() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Untyped resolution of `key`.
    pub fn resolve_key(&self, key: &Key) -> DiResult<AnyArc> {
        self.ensure_live()?;
        let mut path = ResolutionPath::new(self.inner.config.max_depth);
        self.resolve_in(key, &mut path)
    }

    // ----- Hierarchy -----

    /// Process-unique id of this scope.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Distance from the root (the root is 0).
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    pub fn parent(&self) -> Option<&Injector> {
        self.inner.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.inner.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    /// Number of child scopes that are still referenced and not destroyed.
    pub fn live_children(&self) -> usize {
        let mut children = self.inner.children.lock();
        children.retain(|weak| weak.strong_count() > 0);
        children
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|child| !child.destroyed.load(Ordering::Acquire))
            .count()
    }

    /// Number of instances this scope has constructed and cached.
    pub fn cached_instances(&self) -> usize {
        self.inner.cache.len()
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn same_scope(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ----- Teardown -----

    /// Destroys this scope.
    ///
    /// Runs the sync teardown hooks of instances this scope constructed in
    /// reverse construction order, drops its cache, and detaches it from its
    /// parent. Ancestor state is never touched.
    ///
    /// Fails with [`DiError::InvalidScope`] if the scope is already destroyed
    /// or still has live child scopes; children must be destroyed (or
    /// dropped) first, so the root of a running application cannot be torn
    /// down from under its components. Async hooks are skipped with a warning;
    /// use [`destroy_async`](Injector::destroy_async) for scopes that have them.
    pub fn destroy(&self) -> DiResult<()> {
        let mut queue = self.begin_destroy()?;
        let ran = queue.drain_sync(self.id());
        self.finish_destroy(ran);
        Ok(())
    }

    /// Destroys this scope, running async teardown hooks first and then the
    /// sync ones, each in reverse construction order.
    ///
    /// Same policy as [`destroy`](Injector::destroy).
    pub async fn destroy_async(&self) -> DiResult<()> {
        let mut queue = self.begin_destroy()?;
        let ran = queue.drain(self.id()).await;
        self.finish_destroy(ran);
        Ok(())
    }

    fn begin_destroy(&self) -> DiResult<TeardownQueue> {
        {
            let mut children = self.inner.children.lock();
            if self.is_destroyed() {
                return Err(DiError::invalid_scope(self.describe(), "already destroyed"));
            }

            children.retain(|weak| weak.strong_count() > 0);
            let live = children
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|child| !child.destroyed.load(Ordering::Acquire))
                .count();
            if live > 0 {
                return Err(DiError::invalid_scope(
                    self.describe(),
                    format!("{live} live child scope(s) must be destroyed first"),
                ));
            }

            self.inner.destroyed.store(true, Ordering::Release);
        }

        // Constructions finishing after this point see the flag under the
        // same lock and tear their instance down themselves
        Ok(std::mem::take(&mut *self.inner.teardown.lock()))
    }

    fn finish_destroy(&self, hooks_run: usize) {
        let released = self.inner.cache.clear();

        if let Some(parent) = &self.inner.parent {
            let me = Arc::as_ptr(&self.inner);
            parent
                .inner
                .children
                .lock()
                .retain(|weak| weak.strong_count() > 0 && weak.as_ptr() != me);
        }

        debug!(scope = self.id(), released, hooks_run, "Destroyed injector");
    }

    pub(crate) fn ensure_live(&self) -> DiResult<()> {
        if self.is_destroyed() {
            Err(DiError::invalid_scope(self.describe(), "scope has been destroyed"))
        } else {
            Ok(())
        }
    }

    pub(crate) fn describe(&self) -> String {
        if self.is_root() {
            format!("injector#{} (root)", self.id())
        } else {
            format!("injector#{}", self.id())
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self
            .inner
            .registry
            .read()
            .iter()
            .map(|(key, reg)| format!("{key} ({})", reg.kind))
            .collect();
        f.debug_struct("Injector")
            .field("id", &self.inner.id)
            .field("depth", &self.inner.depth)
            .field("parent", &self.inner.parent.as_ref().map(Injector::id))
            .field("destroyed", &self.is_destroyed())
            .field("providers", &tokens)
            .finish()
    }
}

impl Drop for InjectorInner {
    fn drop(&mut self) {
        if self.destroyed.load(Ordering::Acquire) || !self.config.warn_on_undisposed_drop {
            return;
        }
        if !self.teardown.get_mut().is_empty() {
            warn!(
                scope = self.id,
                "Injector dropped with undisposed instances. Call destroy() before dropping."
            );
        }
    }
}
