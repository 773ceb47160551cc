//! Constructible types.

use crate::error::DiResult;
use crate::injector::Dependencies;
use crate::key::Key;

/// A type the container can construct from its declared dependencies.
///
/// This is the class side of a class provider: the dependency list is
/// explicit and ordered, and [`construct`](Injectable::construct) receives the
/// resolved instances in that order. A type implementing `Injectable` can be
/// provided under its own type token (`Providers::class`) or under any custom
/// `Token<Self>` (`Providers::class_as`).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scoped_di::{Dependencies, DiResult, Injectable, Injector, Key, Providers, Token};
///
/// struct Database {
///     url: String,
/// }
///
/// impl Injectable for Database {
///     fn construct(_: &Dependencies) -> DiResult<Self> {
///         Ok(Database { url: "postgres://localhost".into() })
///     }
/// }
///
/// struct TasksService {
///     db: Arc<Database>,
/// }
///
/// impl Injectable for TasksService {
///     fn dependencies() -> Vec<Key> {
///         vec![Key::of::<Database>()]
///     }
///
///     fn construct(deps: &Dependencies) -> DiResult<Self> {
///         Ok(TasksService { db: deps.get(&Token::of())? })
///     }
/// }
///
/// let mut providers = Providers::new();
/// providers.class::<Database>().class::<TasksService>();
///
/// let root = Injector::root(providers);
/// let tasks = root.resolve(&Token::<TasksService>::of()).unwrap();
/// assert_eq!(tasks.db.url, "postgres://localhost");
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Tokens this type needs, in the order `construct` expects them.
    fn dependencies() -> Vec<Key> {
        Vec::new()
    }

    /// Builds an instance from resolved dependencies.
    fn construct(deps: &Dependencies) -> DiResult<Self>;
}
