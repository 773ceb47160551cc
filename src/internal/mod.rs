//! Internal implementation details.

use std::future::Future;
use std::pin::Pin;

pub(crate) mod cache;
pub(crate) mod circular;

pub(crate) use cache::InstanceCache;
pub(crate) use circular::ResolutionPath;

/// Boxed future returned by async teardown hooks.
pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = ahash::AHashMap<K, V>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "ahash")]
pub(crate) type FastSet<T> = ahash::AHashSet<T>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastSet<T> = std::collections::HashSet<T>;
