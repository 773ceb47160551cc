//! Token identity for the dependency injection container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity part of a [`Key`].
///
/// A key is either the canonical key of a type (its `TypeId`) or a fresh
/// identity minted by [`Token::new`]. Both kinds live in the same maps and are
/// treated identically during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyId {
    /// Canonical key of a type: the type serves as its own token
    Type(TypeId),
    /// Process-unique key created by [`Token::new`]
    Unique(u64),
}

/// Untyped token identity used for registry and cache lookup.
///
/// Equality and hashing use the identity only; the label exists for
/// diagnostics. Two keys with the same label but different identities are
/// different keys.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{Key, Token};
///
/// let a = Token::<String>::new("config");
/// let b = Token::<String>::new("config");
///
/// assert_ne!(a.key(), b.key());
/// assert_eq!(a.key(), a.clone().key());
/// assert_eq!(a.key().label(), "config");
/// ```
#[derive(Clone)]
pub struct Key {
    id: KeyId,
    label: Arc<str>,
}

impl Key {
    /// Canonical key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key {
            id: KeyId::Type(TypeId::of::<T>()),
            label: Arc::from(std::any::type_name::<T>()),
        }
    }

    fn unique(label: Arc<str>) -> Self {
        Key {
            id: KeyId::Unique(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed)),
            label,
        }
    }

    /// The identity of this key.
    #[inline]
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// Human-readable label for diagnostics.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if this is the canonical key of a type.
    pub fn is_type_key(&self) -> bool {
        matches!(self.id, KeyId::Type(_))
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            KeyId::Type(_) => write!(f, "Key({})", self.label),
            KeyId::Unique(n) => write!(f, "Key({} #{})", self.label, n),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Typed token identifying something that can be injected.
///
/// `T` is the type an injector hands back when the token is resolved; it may
/// be unsized (`Token<dyn Trait>`). A token is created once and then cloned
/// or shared (e.g. from a `static`); every clone refers to the same registry
/// entry.
///
/// There are two ways to obtain a token:
///
/// - [`Token::of`]: the type itself is the token (`TasksService` is provided
///   and requested as `TasksService`).
/// - [`Token::new`]: a fresh custom token with a debug label, for when several
///   registrations share a type or the requested type is a trait object.
///
/// # Examples
///
/// ```rust
/// use once_cell::sync::Lazy;
/// use scoped_di::Token;
///
/// struct TasksService;
///
/// static TASKS_TOKEN: Lazy<Token<TasksService>> =
///     Lazy::new(|| Token::new("tasks-service-token"));
///
/// // Type tokens are canonical: every call yields the same identity.
/// assert_eq!(Token::<TasksService>::of(), Token::<TasksService>::of());
///
/// // Custom tokens never collide with the type token.
/// assert_ne!(TASKS_TOKEN.key(), Token::<TasksService>::of().key());
/// assert_eq!(TASKS_TOKEN.label(), "tasks-service-token");
/// ```
pub struct Token<T: ?Sized> {
    key: Key,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized + 'static> Token<T> {
    /// Creates a fresh token with a unique identity.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Token {
            key: Key::unique(label.into()),
            _marker: PhantomData,
        }
    }

    /// Canonical token of type `T`.
    #[inline]
    pub fn of() -> Self {
        Token {
            key: Key::of::<T>(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Token<T> {
    /// Untyped identity of this token.
    #[inline]
    pub fn key(&self) -> Key {
        self.key.clone()
    }

    #[inline]
    pub(crate) fn key_ref(&self) -> &Key {
        &self.key
    }

    /// Debug label of this token.
    #[inline]
    pub fn label(&self) -> &str {
        self.key.label()
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        Token {
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.key).finish()
    }
}

impl<T: ?Sized> From<&Token<T>> for Key {
    fn from(token: &Token<T>) -> Self {
        token.key()
    }
}

impl<T: ?Sized> From<Token<T>> for Key {
    fn from(token: Token<T>) -> Self {
        token.key
    }
}

// Helper for dependency lists built from type tokens
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}
