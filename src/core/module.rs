//! Module composition root.
//!
//! A `Module` is the per-module configuration hub: identity, properties,
//! dependency and repository sets, step wiring, and the convention applier
//! state machine. It is created once per build module at configuration
//! time and finalized exactly once, when all properties are expected to be
//! stable.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::conventions::shade::MergeSpec;
use crate::conventions::publish::Publication;
use crate::conventions::{Convention, ConventionSet};
use crate::core::repository::RepositorySet;
use crate::core::steps::{StepGraph, ASSEMBLE};
use crate::core::Target;
use crate::util::errors::ConfigError;

/// Dependency scopes, mirroring how the external resolver consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Transitively visible to consumers of the module.
    Api,
    /// Needed to build and run, not exported.
    Implementation,
    /// Compile-time only.
    CompileOnly,
}

/// A declared dependency edge: a sibling project or an external artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyRef {
    /// Another module of the same build.
    Project { name: String },
    /// An external coordinate notation.
    External { notation: String },
}

impl DependencyRef {
    pub fn project(name: impl Into<String>) -> Self {
        DependencyRef::Project { name: name.into() }
    }

    pub fn external(notation: impl Into<String>) -> Self {
        DependencyRef::External {
            notation: notation.into(),
        }
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyRef::Project { name } => write!(f, "project:{name}"),
            DependencyRef::External { notation } => f.write_str(notation),
        }
    }
}

/// One scoped dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEntry {
    pub scope: Scope,
    pub reference: DependencyRef,
}

/// The module's declared dependencies, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencySet {
    entries: Vec<DependencyEntry>,
}

impl DependencySet {
    pub fn entries(&self) -> &[DependencyEntry] {
        &self.entries
    }

    /// Entries with the given scope, in declaration order.
    pub fn with_scope(&self, scope: Scope) -> impl Iterator<Item = &DependencyEntry> {
        self.entries.iter().filter(move |e| e.scope == scope)
    }

    pub fn contains(&self, reference: &DependencyRef) -> bool {
        self.entries.iter().any(|e| &e.reference == reference)
    }

    fn add(&mut self, scope: Scope, reference: DependencyRef) {
        self.entries.push(DependencyEntry { scope, reference });
    }
}

/// Declarative compiler options, passed through verbatim to the external
/// toolchain configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolchainOptions {
    pub language_level: Option<u32>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleState {
    /// Conventions may be applied and properties set.
    Configuring,
    /// Deferred hooks are running; mutation is still allowed.
    Finalizing,
    /// Terminal. All mutation fails with `AlreadyFinalized`.
    Finalized,
}

/// Per-module composition root and convention applier.
pub struct Module {
    name: String,
    version: String,
    description: Option<String>,
    root_description: Option<String>,
    platform: Option<Target>,
    properties: BTreeMap<String, String>,
    repositories: RepositorySet,
    dependencies: DependencySet,
    toolchain: ToolchainOptions,
    steps: StepGraph,
    merge_includes: Vec<DependencyRef>,
    merge_spec: Option<MergeSpec>,
    publication: Option<Publication>,
    conventions: ConventionSet,
    state: ModuleState,
}

impl Module {
    /// Create a module with its own repository set.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let mut steps = StepGraph::new();
        steps.add(ASSEMBLE);
        Module {
            name: name.into(),
            version: version.into(),
            description: None,
            root_description: None,
            platform: None,
            properties: BTreeMap::new(),
            repositories: RepositorySet::new(),
            dependencies: DependencySet::default(),
            toolchain: ToolchainOptions::default(),
            steps,
            merge_includes: Vec::new(),
            merge_spec: None,
            publication: None,
            conventions: ConventionSet::new(),
            state: ModuleState::Configuring,
        }
    }

    /// Share a repository set with other modules of the same session.
    pub fn with_repository_set(mut self, repositories: RepositorySet) -> Self {
        self.repositories = repositories;
        self
    }

    /// Record the root-level placeholder description. Publication assembly
    /// rejects module descriptions equal to this placeholder.
    pub fn with_root_description(mut self, description: impl Into<String>) -> Self {
        self.root_description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn root_description(&self) -> Option<&str> {
        self.root_description.as_deref()
    }

    pub fn platform(&self) -> Option<&Target> {
        self.platform.as_ref()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn repositories(&self) -> &RepositorySet {
        &self.repositories
    }

    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    pub fn toolchain(&self) -> &ToolchainOptions {
        &self.toolchain
    }

    pub fn steps(&self) -> &StepGraph {
        &self.steps
    }

    /// The merge references declared for shading, in declaration order.
    pub fn merge_includes(&self) -> &[DependencyRef] {
        &self.merge_includes
    }

    /// The merge instruction produced by the shading convention, if any.
    pub fn merge_spec(&self) -> Option<&MergeSpec> {
        self.merge_spec.as_ref()
    }

    /// The publication produced by the publishing convention, if any.
    pub fn publication(&self) -> Option<&Publication> {
        self.publication.as_ref()
    }

    /// Ids of the applied conventions, in application order.
    pub fn applied_conventions(&self) -> Vec<crate::conventions::ConventionId> {
        self.conventions.ids()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == ModuleState::Finalized
    }

    /// Property keys this module exposes for external resource templating:
    /// `version`, `rootDescription`, `url`. The engine does not template.
    pub fn resource_inputs(&self) -> BTreeMap<String, String> {
        let mut inputs = BTreeMap::new();
        inputs.insert("version".to_string(), self.version.clone());
        if let Some(root) = &self.root_description {
            inputs.insert("rootDescription".to_string(), root.clone());
        }
        if let Some(url) = self.property("url") {
            inputs.insert("url".to_string(), url.to_string());
        }
        inputs
    }

    fn ensure_mutable(&self) -> Result<(), ConfigError> {
        if self.state == ModuleState::Finalized {
            return Err(ConfigError::AlreadyFinalized {
                module: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.description = Some(description.into());
        Ok(())
    }

    /// Bind the module to a platform target. At most one target per module.
    pub fn set_platform(&mut self, target: Target) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.platform = Some(target);
        Ok(())
    }

    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.properties.insert(key.into(), value.into());
        Ok(())
    }

    pub fn add_dependency(
        &mut self,
        scope: Scope,
        reference: DependencyRef,
    ) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.dependencies.add(scope, reference);
        Ok(())
    }

    /// Declare a reference to be merged into the shaded artifact.
    /// Declaration order is the merge order.
    pub fn declare_merge_include(&mut self, reference: DependencyRef) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.merge_includes.push(reference);
        Ok(())
    }

    pub fn set_toolchain_options(&mut self, options: ToolchainOptions) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.toolchain = options;
        Ok(())
    }

    pub fn steps_mut(&mut self) -> Result<&mut StepGraph, ConfigError> {
        self.ensure_mutable()?;
        Ok(&mut self.steps)
    }

    pub fn set_merge_spec(&mut self, spec: MergeSpec) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.merge_spec = Some(spec);
        Ok(())
    }

    pub fn set_publication(&mut self, publication: Publication) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.publication = Some(publication);
        Ok(())
    }

    /// Apply a convention: record its id and run its eager registration.
    ///
    /// Re-applying an id already present is a silent no-op, so convention
    /// application stays composable across independently-configured module
    /// fragments. A missing hard prerequisite fails here, at application
    /// time.
    pub fn apply(&mut self, convention: Arc<dyn Convention>) -> Result<(), ConfigError> {
        if self.state != ModuleState::Configuring {
            return Err(ConfigError::AlreadyFinalized {
                module: self.name.clone(),
            });
        }
        let id = convention.id();
        if self.conventions.is_applied(id) {
            tracing::debug!(module = %self.name, convention = id, "convention already applied, skipping");
            return Ok(());
        }
        for requirement in convention.requires() {
            if !self.conventions.is_applied(requirement) {
                return Err(ConfigError::MissingPrerequisite {
                    module: self.name.clone(),
                    convention: id,
                    requirement,
                });
            }
        }
        self.conventions.record(Arc::clone(&convention));
        convention.register(self)
    }

    /// Run every applied convention's deferred hook, in prerequisite order.
    ///
    /// Exactly one finalization per module: a second call fails with
    /// `AlreadyFinalized`. Hooks fail fast - on the first error the
    /// remaining hooks do not run and the module stays aborted.
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.state != ModuleState::Configuring {
            return Err(ConfigError::AlreadyFinalized {
                module: self.name.clone(),
            });
        }
        self.state = ModuleState::Finalizing;
        let result = self.run_deferred();
        self.state = ModuleState::Finalized;
        result
    }

    fn run_deferred(&mut self) -> Result<(), ConfigError> {
        let order = self.conventions.finalize_order(&self.name)?;
        tracing::debug!(
            module = %self.name,
            order = ?order.iter().map(|c| c.id()).collect::<Vec<_>>(),
            "finalizing module"
        );
        for convention in order {
            convention.finalize(self)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("conventions", &self.conventions.ids())
            .field("state", &self.state)
            .finish()
    }
}
