//! Artifact coordinates - WHAT dependency (group + artifact + version).
//!
//! A `Dependency` is the immutable descriptor for one external artifact:
//! its Maven-style coordinates, an optional classifier, and an optional
//! deferred repository registration needed to resolve it. The coordinate
//! notation is computed once at construction and never mutated; no network
//! or resolution happens here, only at resolution time inside the external
//! resolver.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::repository::RepositoryAction;

/// An immutable artifact coordinate with an optional repository hook.
#[derive(Clone)]
pub struct Dependency {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: Option<String>,
    notation: String,
    repository: Option<RepositoryAction>,
}

impl Dependency {
    /// Create a descriptor from the three mandatory identity fields.
    ///
    /// Always succeeds; the notation `group:artifact:version` is derived
    /// immediately.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        let version = version.into();
        let notation = format!("{group_id}:{artifact_id}:{version}");
        Dependency {
            group_id,
            artifact_id,
            version,
            classifier: None,
            notation,
            repository: None,
        }
    }

    /// Attach a classifier, extending the notation with `:classifier`.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.notation = format!(
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, classifier
        );
        self.classifier = Some(classifier);
        self
    }

    /// Attach the deferred repository registration this artifact needs.
    pub fn with_repository(mut self, repository: impl Into<RepositoryAction>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// The coordinate notation: `group:artifact:version[:classifier]`.
    pub fn notation(&self) -> &str {
        &self.notation
    }

    /// The repository registration this artifact needs, if any.
    pub fn repository(&self) -> Option<&RepositoryAction> {
        self.repository.as_ref()
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("notation", &self.notation)
            .field("repository", &self.repository.is_some())
            .finish()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        // Notation is a pure function of the four identity fields.
        self.notation == other.notation
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.notation.hash(state)
    }
}
