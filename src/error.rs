//! Error types for the dependency injection container.

use std::fmt;

use crate::key::Key;

/// Dependency injection errors
///
/// Every variant is a configuration or programming error: the container never
/// retries, substitutes defaults, or partially succeeds. Errors carry token
/// labels (not identities) so they can be logged or compared in tests.
///
/// # Examples
///
/// ```rust
/// use scoped_di::{DiError, Injector, Providers, Token};
///
/// struct Missing;
///
/// let root = Injector::root(Providers::new());
/// match root.resolve(&Token::<Missing>::of()) {
///     Err(DiError::Unsatisfied { token, required_by }) => {
///         assert!(token.ends_with("Missing"));
///         assert!(required_by.is_empty());
///     }
///     _ => unreachable!(),
/// }
///
/// let cyclic = DiError::Cyclic { path: vec!["A".into(), "B".into(), "A".into()] };
/// assert_eq!(cyclic.to_string(), "Cyclic dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiError {
    /// No provider for the token anywhere in the scope chain
    #[error("No provider for {token}{}", RequiredBy(required_by))]
    Unsatisfied {
        /// Label of the token that could not be satisfied
        token: String,
        /// Labels of the tokens whose construction needed it, outermost first
        required_by: Vec<String>,
    },
    /// A token appeared twice in one resolution path
    #[error("Cyclic dependency: {}", path.join(" -> "))]
    Cyclic {
        /// Resolution path ending with the repeated token
        path: Vec<String>,
    },
    /// Operation on a destroyed scope, or one the scope's state forbids
    #[error("Invalid scope {scope}: {reason}")]
    InvalidScope {
        /// Scope description, e.g. `injector#3`
        scope: String,
        /// What was refused
        reason: String,
    },
    /// A cached or provided instance is not of the type its token promises
    #[error("Type mismatch for {token}: expected {expected}")]
    TypeMismatch {
        /// Label of the token
        token: String,
        /// Type name the caller asked for
        expected: &'static str,
    },
    /// A constructor asked for a dependency it never declared
    #[error("{token} did not declare a dependency on {dependency}")]
    UndeclaredDependency {
        /// Label of the token being constructed
        token: String,
        /// Label of the dependency that was requested
        dependency: String,
    },
    /// Maximum resolution depth exceeded
    #[error("Max resolution depth {depth} exceeded")]
    DepthExceeded {
        /// Configured maximum
        depth: usize,
    },
    /// A constructor or factory failed on its own terms
    #[error("Failed to construct {token}: {message}")]
    Construction {
        /// Label of the token being constructed
        token: String,
        /// Rendered error returned by the constructor
        message: String,
    },
    /// An environment override could not be parsed
    #[error("Invalid configuration value {value:?} for {key}")]
    Config {
        /// Environment variable name
        key: String,
        /// Raw value found
        value: String,
    },
}

impl DiError {
    /// Wraps a constructor's own error for the given token.
    ///
    /// ```rust
    /// use scoped_di::{DiError, Token};
    ///
    /// let token = Token::<u32>::new("port");
    /// let err = DiError::construction(&token.key(), "not a number");
    /// assert_eq!(err.to_string(), "Failed to construct port: not a number");
    /// ```
    pub fn construction(token: &Key, error: impl fmt::Display) -> Self {
        DiError::Construction {
            token: token.label().to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn invalid_scope(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        DiError::InvalidScope {
            scope: scope.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(token: &Key, expected: &'static str) -> Self {
        DiError::TypeMismatch {
            token: token.label().to_string(),
            expected,
        }
    }

    /// Returns `true` for the two fatal graph errors: missing providers and cycles.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, DiError::Unsatisfied { .. } | DiError::Cyclic { .. })
    }
}

struct RequiredBy<'a>(&'a [String]);

impl fmt::Display for RequiredBy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, " (required by {})", self.0.join(" -> "))
        }
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
