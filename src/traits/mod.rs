//! Core traits for the dependency injection container.

mod dispose;
mod injectable;

pub use dispose::{AsyncDispose, Dispose};
pub use injectable::Injectable;
