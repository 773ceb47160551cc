//! Static validation of an injector's provider graph.
//!
//! Finds missing providers and dependency cycles without constructing
//! anything.

use crate::error::{DiError, DiResult};
use crate::injector::Injector;
use crate::internal::FastSet;
use crate::key::Key;

/// Outcome of [`Injector::validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Every problem found, in discovery order
    pub issues: Vec<DiError>,
    /// Number of distinct (scope, token) pairs checked
    pub checked: usize,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// The first issue as an error, if any.
    pub fn into_result(self) -> DiResult<()> {
        match self.issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }
}

impl Injector {
    /// Checks that every token visible from this scope can be resolved.
    ///
    /// Follows the same rules as resolution (nearest provider wins,
    /// dependencies resolved from the owning scope) but only inspects
    /// registrations. Already-cached instances are not special-cased.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_di::{DiError, Injector, Provider, Providers, Token};
    ///
    /// let a = Token::<u8>::new("A");
    /// let b = Token::<u8>::new("B");
    /// let missing = Token::<u8>::new("missing");
    ///
    /// let mut providers = Providers::new();
    /// providers
    ///     .provide(&a, Provider::factory([b.key()], |_| Ok(1)))
    ///     .provide(&b, Provider::factory([missing.key()], |_| Ok(2)));
    ///
    /// let report = Injector::root(providers).validate();
    /// assert_eq!(
    ///     report.issues,
    ///     vec![DiError::Unsatisfied {
    ///         token: "missing".into(),
    ///         required_by: vec!["A".into(), "B".into()],
    ///     }]
    /// );
    /// ```
    pub fn validate(&self) -> ValidationReport {
        let mut walker = Walker {
            stack: Vec::new(),
            done: FastSet::default(),
            report: ValidationReport::default(),
        };

        let mut seen = FastSet::default();
        let mut scope = Some(self);
        while let Some(current) = scope {
            for key in current.local_keys() {
                // Shadowed registrations are unreachable from here
                if seen.insert(key.clone()) {
                    walker.visit(self, &key);
                }
            }
            scope = current.parent();
        }

        walker.report
    }
}

struct Walker {
    stack: Vec<Key>,
    done: FastSet<(u64, Key)>,
    report: ValidationReport,
}

impl Walker {
    fn visit(&mut self, from: &Injector, key: &Key) {
        if self.stack.contains(key) {
            let mut path: Vec<String> = self.stack.iter().map(|k| k.label().to_string()).collect();
            path.push(key.label().to_string());
            self.report.issues.push(DiError::Cyclic { path });
            return;
        }

        let Some((owner, registration)) = from.find_provider(key) else {
            self.report.issues.push(DiError::Unsatisfied {
                token: key.label().to_string(),
                required_by: self.stack.iter().map(|k| k.label().to_string()).collect(),
            });
            return;
        };

        if !self.done.insert((owner.id(), key.clone())) {
            return;
        }
        self.report.checked += 1;

        self.stack.push(key.clone());
        for dep in registration.requirements() {
            self.visit(&owner, dep);
        }
        self.stack.pop();
    }
}
