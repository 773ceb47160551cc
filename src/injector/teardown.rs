//! Teardown hooks of the instances a scope constructed.

use tracing::{trace, warn};

use crate::internal::BoxFutureUnit;
use crate::key::Key;
use crate::registration::{AnyArc, Teardown};

/// Pending teardown action bound to one constructed instance
pub(crate) enum Hook {
    Sync(Box<dyn FnOnce() + Send>),
    Async(Box<dyn FnOnce() -> BoxFutureUnit + Send>),
}

impl Hook {
    /// Binds a provider's teardown to the instance it just built.
    ///
    /// `None` if the instance is not of the type the provider declared.
    pub(crate) fn bind(teardown: &Teardown, instance: &AnyArc) -> Option<Self> {
        match teardown {
            Teardown::Sync(f) => f(instance).map(Hook::Sync),
            Teardown::Async(f) => f(instance).map(Hook::Async),
        }
    }
}

/// Hooks of one scope, in construction order.
///
/// Draining runs them newest first, so an instance is torn down before the
/// dependencies it was built from.
#[derive(Default)]
pub(crate) struct TeardownQueue {
    hooks: Vec<(Key, Hook)>,
}

impl TeardownQueue {
    pub(crate) fn push(&mut self, key: Key, hook: Hook) {
        self.hooks.push((key, hook));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs the sync hooks and returns how many ran.
    ///
    /// Async hooks need an executor and are dropped with a warning.
    pub(crate) fn drain_sync(&mut self, scope: u64) -> usize {
        let mut ran = 0;
        while let Some((key, hook)) = self.hooks.pop() {
            match hook {
                Hook::Sync(f) => {
                    trace!(scope, token = %key, "Running teardown hook");
                    f();
                    ran += 1;
                }
                Hook::Async(_) => {
                    warn!(scope, token = %key, "Async teardown hook skipped; use destroy_async()")
                }
            }
        }
        ran
    }

    /// Runs every async hook, then every sync hook, and returns how many ran.
    pub(crate) async fn drain(&mut self, scope: u64) -> usize {
        let mut deferred: Vec<(Key, Box<dyn FnOnce() + Send>)> = Vec::new();
        let mut ran = 0;

        while let Some((key, hook)) = self.hooks.pop() {
            match hook {
                Hook::Async(f) => {
                    trace!(scope, token = %key, "Running async teardown hook");
                    f().await;
                    ran += 1;
                }
                Hook::Sync(f) => deferred.push((key, f)),
            }
        }

        // Already newest first
        for (key, f) in deferred {
            trace!(scope, token = %key, "Running teardown hook");
            f();
            ran += 1;
        }
        ran
    }
}
