//! Disposal traits for scope teardown.

/// Trait for synchronous teardown of constructed instances.
///
/// Implement this for services that need structured teardown (flushing
/// buffers, closing handles) and register them with
/// [`Provider::disposable`](crate::Provider::disposable). Hooks run in LIFO
/// order when the owning scope is destroyed.
///
/// # Examples
///
/// ```
/// use scoped_di::{Dependencies, DiResult, Dispose, Injectable, Injector, Provider, Providers, Token};
///
/// struct Cache;
///
/// impl Injectable for Cache {
///     fn construct(_: &Dependencies) -> DiResult<Self> {
///         Ok(Cache)
///     }
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache");
///     }
/// }
///
/// let mut providers = Providers::new();
/// providers.provide(&Token::<Cache>::of(), Provider::<Cache>::class().disposable());
///
/// let root = Injector::root(providers);
/// root.resolve(&Token::<Cache>::of()).unwrap();
/// root.destroy().unwrap(); // prints "Flushing cache"
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous teardown of constructed instances.
///
/// Async hooks only run through
/// [`Injector::destroy_async`](crate::Injector::destroy_async), before the
/// sync hooks of the same scope.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use scoped_di::{AsyncDispose, Injector, Provider, Providers, Token};
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) {
///         println!("Closing database connection: {}", self.connection_id);
///     }
/// }
///
/// # async fn example() {
/// let client = Token::<DatabaseClient>::new("db-client");
/// let mut providers = Providers::new();
/// providers.provide(
///     &client,
///     Provider::factory([], |_| Ok(DatabaseClient { connection_id: "conn_123".into() }))
///         .async_disposable(),
/// );
///
/// let root = Injector::root(providers);
/// root.resolve(&client).unwrap();
/// root.destroy_async().await.unwrap();
/// # }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}
