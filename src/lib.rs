//! # scoped-di
//!
//! Hierarchical, token-based dependency injection for Rust.
//!
//! ## Features
//!
//! - **Tokens**: typed identities, either one per type (`Token::<T>::of()`) or
//!   named and unique (`Token::<T>::new("label")`), including trait objects
//! - **Providers**: class, value, factory and alias recipes
//! - **Scope hierarchy**: child injectors override tokens without touching
//!   their ancestors
//! - **Singleton per scope**: each (token, owning scope) pair is constructed at
//!   most once, also under concurrent resolution
//! - **Cycle detection**: dependency loops fail with the full token path
//! - **Teardown**: sync and async dispose hooks run in reverse construction
//!   order when a scope is destroyed
//!
//! ## Quick Start
//!
//! ```rust
//! use scoped_di::{Dependencies, DiResult, Injectable, Injector, Key, Providers, Token};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn dependencies() -> Vec<Key> {
//!         vec![Key::of::<Database>()]
//!     }
//!
//!     fn construct(deps: &Dependencies) -> DiResult<Self> {
//!         Ok(UserService { db: deps.at(0)? })
//!     }
//! }
//!
//! let mut providers = Providers::new();
//! providers
//!     .value(&Token::of(), Database { url: "postgres://localhost".to_string() })
//!     .class::<UserService>();
//!
//! let root = Injector::root(providers);
//! let users = root.resolve(&Token::<UserService>::of()).unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Scopes
//!
//! Resolution walks from the requesting injector toward the root and uses the
//! nearest provider. The instance lives in the cache of the scope that owns
//! that provider, and its dependencies are resolved from there as well. A child
//! scope therefore shares its ancestors' instances unless it overrides the
//! token itself.

pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod injector;
pub mod key;
pub mod provider;
pub mod traits;
pub mod validation;

mod internal;
mod registration;

pub use collection::Providers;
pub use config::InjectorConfig;
pub use descriptors::{ProviderDescriptor, TeardownKind};
pub use error::{DiError, DiResult};
pub use injector::{Dependencies, Injector};
pub use key::{key_of_type, Key, KeyId, Token};
pub use provider::{Provider, ProviderKind};
pub use registration::AnyArc;
pub use traits::{AsyncDispose, Dispose, Injectable};
pub use validation::ValidationReport;
