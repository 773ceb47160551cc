//! Resolution engine.
//!
//! Resolution walks from the requesting scope toward the root, stops at the
//! first scope that registers the token (the owning scope), and serves the
//! instance from the owning scope's cache, constructing it there on a miss.
//! Dependencies and alias targets are resolved from the owning scope, so an
//! instance cached in an ancestor never depends on which descendant asked for
//! it first.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::teardown::{Hook, TeardownQueue};
use super::{Dependencies, Injector};
use crate::error::{DiError, DiResult};
use crate::internal::ResolutionPath;
use crate::key::Key;
use crate::registration::{AnyArc, Recipe, Registration, Teardown};

impl Injector {
    /// Nearest scope (starting with this one) registering `key`, with its
    /// registration.
    pub(crate) fn find_provider(&self, key: &Key) -> Option<(Injector, Registration)> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(registration) = current.local_registration(key) {
                trace!(
                    token = %key,
                    owner = current.id(),
                    requested_from = self.id(),
                    "Found provider"
                );
                return Some((current.clone(), registration));
            }
            scope = current.parent();
        }
        None
    }

    pub(crate) fn resolve_in(&self, key: &Key, path: &mut ResolutionPath) -> DiResult<AnyArc> {
        path.within(key, |path| {
            let Some((owner, registration)) = self.find_provider(key) else {
                return Err(DiError::Unsatisfied {
                    token: key.label().to_string(),
                    required_by: path.required_by(),
                });
            };

            if let Some(instance) = owner.inner.cache.get(key) {
                trace!(token = %key, owner = owner.id(), depth = path.depth(), "Cache hit");
                return Ok(instance);
            }

            owner.construct(key, &registration, path)
        })
    }

    /// Produces and caches the instance for `key` in this (owning) scope.
    fn construct(
        &self,
        key: &Key,
        registration: &Registration,
        path: &mut ResolutionPath,
    ) -> DiResult<AnyArc> {
        match &registration.recipe {
            Recipe::Value(value) => self.inner.cache.get_or_try_init(key, || {
                self.ensure_live()?;
                Ok(value.clone())
            }),
            Recipe::Alias(target) => {
                let instance = self.resolve_in(target, path)?;
                // Forwarding entry: later lookups of the alias skip the walk
                self.inner.cache.get_or_try_init(key, || {
                    self.ensure_live()?;
                    Ok(instance)
                })
            }
            Recipe::Construct { deps, ctor } => {
                // Dependencies first, outside the slot: a constructor never
                // runs while another slot of this resolution is held.
                let mut resolved = SmallVec::with_capacity(deps.len());
                for dep in deps.iter() {
                    resolved.push((dep.clone(), self.resolve_in(dep, path)?));
                }
                let dependencies = Dependencies::new(key.clone(), resolved);

                self.inner.cache.get_or_try_init(key, || {
                    self.ensure_live()?;
                    let instance = ctor(&dependencies)?;
                    self.adopt(key, registration.teardown.as_ref(), &instance)?;
                    debug!(
                        token = %key,
                        scope = self.id(),
                        kind = %registration.kind,
                        "Constructed instance"
                    );
                    Ok(instance)
                })
            }
        }
    }

    /// Queues the teardown of a freshly built instance.
    ///
    /// A scope destroyed while the constructor ran never publishes the
    /// instance: its hook runs here instead and the resolution fails.
    fn adopt(&self, key: &Key, teardown: Option<&Teardown>, instance: &AnyArc) -> DiResult<()> {
        let hook = teardown.and_then(|teardown| Hook::bind(teardown, instance));

        let mut queue = self.inner.teardown.lock();
        if !self.is_destroyed() {
            if let Some(hook) = hook {
                queue.push(key.clone(), hook);
            }
            return Ok(());
        }
        drop(queue);

        if let Some(hook) = hook {
            let mut orphan = TeardownQueue::default();
            orphan.push(key.clone(), hook);
            orphan.drain_sync(self.id());
        }
        Err(DiError::invalid_scope(
            self.describe(),
            format!("destroyed while {} was being constructed", key.label()),
        ))
    }
}
