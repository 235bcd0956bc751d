//! Target platforms.
//!
//! A `Target` names one platform a module can be built against and owns
//! exactly one dependency: the platform's primary API. Built-in targets
//! live in [`catalog`](crate::catalog) as read-only singletons; adding a
//! platform means declaring a new instance there - the binding convention
//! never changes.

use crate::core::Dependency;

/// A named platform with its primary API dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    dependency: Dependency,
}

impl Target {
    /// The only constructor path: every target carries a dependency.
    pub fn new(name: impl Into<String>, dependency: Dependency) -> Self {
        Target {
            name: name.into(),
            dependency,
        }
    }

    /// Human-readable platform identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The platform's primary API dependency, exposing the repository hook
    /// for lazy registration by the binding convention.
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }
}
