//! Named package repositories and the process-wide repository set.
//!
//! Repositories are never contacted by this crate; they are declarative
//! records handed to the external dependency resolver. What the engine owns
//! is *when* a repository becomes known: a `RepositoryAction` stored on a
//! dependency defers registration until a binding convention runs, and the
//! `RepositorySet` de-duplicates registrations by name so the same action
//! may be referenced from any number of conventions.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use url::Url;

/// A named artifact repository with optional content filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    name: String,
    url: Url,
    #[serde(skip_serializing_if = "ContentFilter::is_empty")]
    content: ContentFilter,
}

/// Restricts which coordinates the resolver may fetch from a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentFilter {
    /// Group ids allowed wholesale.
    pub include_groups: Vec<String>,
    /// Individual (group, module) pairs allowed.
    pub include_modules: Vec<(String, String)>,
}

impl ContentFilter {
    pub fn is_empty(&self) -> bool {
        self.include_groups.is_empty() && self.include_modules.is_empty()
    }
}

impl Repository {
    /// Declare a Maven-layout repository.
    pub fn maven(name: impl Into<String>, url: Url) -> Self {
        Repository {
            name: name.into(),
            url,
            content: ContentFilter::default(),
        }
    }

    /// Allow an entire group through this repository.
    pub fn include_group(mut self, group: impl Into<String>) -> Self {
        self.content.include_groups.push(group.into());
        self
    }

    /// Allow a single (group, module) pair through this repository.
    pub fn include_module(mut self, group: impl Into<String>, module: impl Into<String>) -> Self {
        self.content
            .include_modules
            .push((group.into(), module.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn content(&self) -> &ContentFilter {
        &self.content
    }
}

/// A deferred repository registration.
///
/// Stored on a [`Dependency`](crate::core::Dependency) at construction time
/// and invoked at most once per build, when a binding convention finalizes.
/// Actions must be idempotent; the set-level name de-duplication makes the
/// common single-repository case idempotent for free.
#[derive(Clone)]
pub struct RepositoryAction {
    run: Arc<dyn Fn(&RepositorySet) + Send + Sync>,
}

impl RepositoryAction {
    pub fn new(run: impl Fn(&RepositorySet) + Send + Sync + 'static) -> Self {
        RepositoryAction { run: Arc::new(run) }
    }

    /// Invoke the registration against a repository set.
    pub fn run(&self, repositories: &RepositorySet) {
        (self.run)(repositories)
    }
}

impl From<Repository> for RepositoryAction {
    fn from(repository: Repository) -> Self {
        RepositoryAction::new(move |set| {
            set.register(repository.clone());
        })
    }
}

impl fmt::Debug for RepositoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The closure has no useful Debug form.
        f.write_str("RepositoryAction")
    }
}

/// The additive, de-duplicated set of named repositories.
///
/// Handles are cheap to clone and share one underlying set, so a build
/// session can hand the same set to every module. Registration is an atomic
/// check-and-insert under a single write lock: concurrent registration of
/// the same name is idempotent, never duplicated, never racily lost.
///
/// Duplicate policy: re-registering an existing name is a logical no-op and
/// the first registration wins.
#[derive(Clone, Default)]
pub struct RepositorySet {
    inner: Arc<RwLock<Vec<Repository>>>,
}

impl RepositorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository. Returns `false` if the name was already
    /// present (the existing entry is kept).
    pub fn register(&self, repository: Repository) -> bool {
        let mut entries = self.inner.write().unwrap();
        if entries.iter().any(|r| r.name() == repository.name()) {
            tracing::debug!(
                repository = repository.name(),
                "repository already registered, skipping"
            );
            return false;
        }
        entries.push(repository);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().unwrap().iter().any(|r| r.name() == name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    /// A point-in-time copy of the registered repositories, for handing to
    /// the external resolver.
    pub fn snapshot(&self) -> Vec<Repository> {
        self.inner.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RepositorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RepositorySet").field(&self.names()).finish()
    }
}
