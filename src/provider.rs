//! Typed providers: how a token gets its instance.
//!
//! A [`Provider<T>`] describes how to satisfy a `Token<T>`: construct a type
//! ([`Provider::class`]), hand out a pre-built value ([`Provider::value`]),
//! call a factory with declared dependencies ([`Provider::factory`]), or
//! forward to another token ([`Provider::alias`]).

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::DiResult;
use crate::injector::Dependencies;
use crate::internal::BoxFutureUnit;
use crate::key::{Key, Token};
use crate::registration::{erase, AnyArc, Recipe, Registration, Teardown};
use crate::traits::{AsyncDispose, Dispose, Injectable};

/// The four ways a token can be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Construct an [`Injectable`] type from its declared dependencies
    Class,
    /// Hand out a pre-built instance
    Value,
    /// Call a factory with declared dependencies
    Factory,
    /// Resolve another token instead
    Alias,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Class => "class",
            ProviderKind::Value => "value",
            ProviderKind::Factory => "factory",
            ProviderKind::Alias => "alias",
        };
        f.write_str(name)
    }
}

/// How to produce the instance behind a `Token<T>`.
///
/// The type parameter ties a provider to the tokens it may be registered
/// under, so a mis-typed registration is a compile error rather than a
/// runtime downcast failure.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use scoped_di::{Injector, Provider, Providers, Token};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let greeter = Token::<dyn Greeter>::new("greeter");
/// let name = Token::<String>::new("name");
/// let message = Token::<String>::new("message");
///
/// let mut providers = Providers::new();
/// providers
///     .provide(&greeter, Provider::value_arc(Arc::new(English) as Arc<dyn Greeter>))
///     .provide(&name, Provider::value("world".to_string()))
///     .provide(
///         &message,
///         Provider::factory([greeter.key(), name.key()], {
///             let (greeter, name) = (greeter.clone(), name.clone());
///             move |deps| Ok(format!("{} {}", deps.get(&greeter)?.greet(), deps.get(&name)?))
///         }),
///     );
///
/// let root = Injector::root(providers);
/// assert_eq!(*root.resolve(&message).unwrap(), "hello world");
/// ```
pub struct Provider<T: ?Sized> {
    pub(crate) registration: Registration,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self::wrap(self.registration.clone())
    }
}

impl<T: ?Sized> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.registration.kind)
            .field("dependencies", &self.registration.requirements())
            .field("disposable", &self.registration.teardown.is_some())
            .finish()
    }
}

impl<T: ?Sized> Provider<T> {
    fn wrap(registration: Registration) -> Self {
        Provider {
            registration,
            _marker: PhantomData,
        }
    }

    /// Which kind of provider this is.
    pub fn kind(&self) -> ProviderKind {
        self.registration.kind
    }

    /// Tokens this provider needs before it can produce an instance.
    pub fn dependencies(&self) -> &[Key] {
        self.registration.requirements()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Provider<T> {
    /// Shares an existing `Arc` as the instance. Works for trait objects.
    pub fn value_arc(value: Arc<T>) -> Self {
        Self::wrap(Registration {
            kind: ProviderKind::Value,
            recipe: Recipe::Value(erase(value)),
            teardown: None,
            impl_name: None,
        })
    }

    /// Factory producing a shared `Arc<T>`. Works for trait objects.
    ///
    /// `deps` are resolved in order before `factory` runs; the factory reads
    /// them from the [`Dependencies`] it is given.
    pub fn factory_arc<F>(deps: impl IntoIterator<Item = Key>, factory: F) -> Self
    where
        F: Fn(&Dependencies) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::wrap(Registration {
            kind: ProviderKind::Factory,
            recipe: Recipe::Construct {
                deps: deps.into_iter().collect(),
                ctor: Arc::new(move |d: &Dependencies| factory(d).map(erase)),
            },
            teardown: None,
            impl_name: None,
        })
    }

    /// Resolves `target` instead, sharing its instance.
    pub fn alias(target: &Token<T>) -> Self {
        Self::wrap(Registration {
            kind: ProviderKind::Alias,
            recipe: Recipe::Alias(target.key()),
            teardown: None,
            impl_name: None,
        })
    }

    /// Runs [`Dispose::dispose`] on instances this provider constructs when
    /// their scope is destroyed.
    ///
    /// Has no effect on value and alias providers: the container only tears
    /// down what it built.
    pub fn disposable(mut self) -> Self
    where
        T: Dispose,
    {
        if self.constructs() {
            self.registration.teardown = Some(Teardown::Sync(Arc::new(|instance: &AnyArc| {
                let instance = instance.downcast_ref::<Arc<T>>()?.clone();
                Some(Box::new(move || instance.dispose()) as Box<dyn FnOnce() + Send>)
            })));
        }
        self
    }

    /// Runs [`AsyncDispose::dispose`] on instances this provider constructs
    /// when their scope is destroyed with `destroy_async`.
    pub fn async_disposable(mut self) -> Self
    where
        T: AsyncDispose,
    {
        if self.constructs() {
            self.registration.teardown = Some(Teardown::Async(Arc::new(|instance: &AnyArc| {
                let instance = instance.downcast_ref::<Arc<T>>()?.clone();
                Some(Box::new(move || {
                    Box::pin(async move { instance.dispose().await }) as BoxFutureUnit
                }) as Box<dyn FnOnce() -> BoxFutureUnit + Send>)
            })));
        }
        self
    }

    fn constructs(&self) -> bool {
        matches!(self.registration.recipe, Recipe::Construct { .. })
    }
}

impl<T: Send + Sync + 'static> Provider<T> {
    /// Hands out `value` as the instance.
    pub fn value(value: T) -> Self {
        Self::value_arc(Arc::new(value))
    }

    /// Factory producing an owned `T`.
    pub fn factory<F>(deps: impl IntoIterator<Item = Key>, factory: F) -> Self
    where
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::factory_arc(deps, move |d| factory(d).map(Arc::new))
    }
}

impl<T: Injectable> Provider<T> {
    /// Constructs `T` through its [`Injectable`] implementation.
    pub fn class() -> Self {
        Self::wrap(Registration {
            kind: ProviderKind::Class,
            recipe: Recipe::Construct {
                deps: T::dependencies().into(),
                ctor: Arc::new(|d: &Dependencies| T::construct(d).map(|v| erase(Arc::new(v)))),
            },
            teardown: None,
            impl_name: Some(type_name::<T>()),
        })
    }
}
