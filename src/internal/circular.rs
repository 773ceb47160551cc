//! Circular dependency detection infrastructure.

use smallvec::SmallVec;

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Keys currently being resolved by one top-level `resolve` call.
///
/// The path is owned by the call and threaded through the recursion, so
/// concurrent resolutions never see each other's state.
pub(crate) struct ResolutionPath {
    stack: SmallVec<[Key; 8]>,
    max_depth: usize,
}

impl ResolutionPath {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: SmallVec::new(),
            max_depth,
        }
    }

    /// Runs `f` with `key` pushed onto the path.
    ///
    /// Fails before running `f` if `key` is already on the path or the path
    /// is at its maximum depth. `key` is popped again whatever `f` returns.
    pub(crate) fn within<T, F>(&mut self, key: &Key, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        // Circular detection BEFORE pushing the key
        if self.stack.iter().any(|k| k == key) {
            let mut path = self.labels();
            path.push(key.label().to_string());
            return Err(DiError::Cyclic { path });
        }

        if self.stack.len() >= self.max_depth {
            return Err(DiError::DepthExceeded { depth: self.max_depth });
        }

        self.stack.push(key.clone());
        let result = f(self);
        let popped = self.stack.pop();
        debug_assert!(popped.as_ref() == Some(key));
        result
    }

    /// Labels of every key on the path, outermost first.
    pub(crate) fn labels(&self) -> Vec<String> {
        self.stack.iter().map(|k| k.label().to_string()).collect()
    }

    /// Labels of the keys that led to the innermost one.
    pub(crate) fn required_by(&self) -> Vec<String> {
        let outer = self.stack.len().saturating_sub(1);
        self.stack[..outer].iter().map(|k| k.label().to_string()).collect()
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }
}
