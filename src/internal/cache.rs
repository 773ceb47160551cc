//! Per-scope instance cache with at-most-once construction.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use super::FastMap;
use crate::error::DiResult;
use crate::key::Key;
use crate::registration::AnyArc;

type Slot = Arc<OnceCell<AnyArc>>;

/// Instances constructed by one scope, keyed by token.
///
/// Each key owns a slot that is claimed under the map lock and initialized
/// outside it: concurrent first requests for the same key wait on the slot
/// while requests for other keys proceed.
#[derive(Default)]
pub(crate) struct InstanceCache {
    slots: Mutex<FastMap<Key, Slot>>,
}

impl InstanceCache {
    /// Returns the cached instance for `key`, if one was published.
    pub(crate) fn get(&self, key: &Key) -> Option<AnyArc> {
        let slots = self.slots.lock();
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Returns the instance for `key`, running `init` if none exists yet.
    ///
    /// `init` runs at most once per key across all threads unless it fails, in
    /// which case the slot stays empty and the next caller retries.
    pub(crate) fn get_or_try_init<F>(&self, key: &Key, init: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let slot = self.claim(key);
        slot.get_or_try_init(init).cloned()
    }

    fn claim(&self, key: &Key) -> Slot {
        let mut slots = self.slots.lock();
        slots.entry(key.clone()).or_default().clone()
    }

    /// Number of published instances.
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    /// Drops every slot, returning how many held an instance.
    pub(crate) fn clear(&self) -> usize {
        let drained: Vec<Slot> = self.slots.lock().drain().map(|(_, slot)| slot).collect();
        drained.iter().filter(|slot| slot.get().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiError;
    use crate::Token;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn failed_init_leaves_slot_empty() {
        let cache = InstanceCache::default();
        let key = Token::<u32>::new("port").key();

        let failed = cache.get_or_try_init(&key, || Err(DiError::construction(&key, "boom")));
        assert!(failed.is_err());
        assert!(!cache.contains(&key));

        let value = cache.get_or_try_init(&key, || Ok(Arc::new(Arc::new(8080u32)) as AnyArc));
        assert!(value.is_ok());
        assert!(cache.contains(&key));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn init_runs_once_per_key() {
        let cache = InstanceCache::default();
        let key = Token::<u32>::new("port").key();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .get_or_try_init(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(Arc::new(1u32)) as AnyArc)
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.clear(), 1);
        assert_eq!(cache.len(), 0);
    }
}
