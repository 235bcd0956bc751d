//! Multi-module build session.
//!
//! A `BuildSession` is the process-level root: it owns the shared
//! repository set and the root placeholder description, creates modules,
//! and finalizes them with per-module isolation - one module's
//! configuration error never aborts a sibling's finalization.

use crate::config::ModuleConfig;
use crate::core::{Module, RepositorySet};
use crate::util::errors::ConfigError;

/// The root of one build process.
#[derive(Debug, Default)]
pub struct BuildSession {
    root_description: Option<String>,
    repositories: RepositorySet,
    modules: Vec<Module>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root-level description. Modules inherit it as the
    /// placeholder that publication assembly rejects.
    pub fn with_root_description(mut self, description: impl Into<String>) -> Self {
        self.root_description = Some(description.into());
        self
    }

    /// The repository set shared by every module of this session.
    pub fn repositories(&self) -> &RepositorySet {
        &self.repositories
    }

    /// Create a module wired to the session's shared state.
    pub fn add_module(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> &mut Module {
        let mut module =
            Module::new(name, version).with_repository_set(self.repositories.clone());
        if let Some(root) = &self.root_description {
            module = module.with_root_description(root.clone());
        }
        self.modules.push(module);
        let last = self.modules.len() - 1;
        &mut self.modules[last]
    }

    /// Create a module from a loaded manifest.
    pub fn add_configured(&mut self, config: &ModuleConfig) -> Result<&mut Module, ConfigError> {
        let mut module =
            Module::new(&config.name, &config.version).with_repository_set(self.repositories.clone());
        if let Some(root) = &self.root_description {
            module = module.with_root_description(root.clone());
        }
        config.apply_to(&mut module)?;
        self.modules.push(module);
        let last = self.modules.len() - 1;
        Ok(&mut self.modules[last])
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.name() == name)
    }

    /// Finalize every module, isolating failures: each module either
    /// finalizes completely or aborts alone.
    pub fn finalize_all(&mut self) -> FinalizeSummary {
        let mut summary = FinalizeSummary::default();
        for module in &mut self.modules {
            let name = module.name().to_string();
            match module.finalize() {
                Ok(()) => summary.succeeded.push(name),
                Err(error) => {
                    tracing::error!(module = %name, %error, "module finalization aborted");
                    summary.failed.push((name, error));
                }
            }
        }
        summary
    }
}

/// Per-module outcomes of [`BuildSession::finalize_all`].
#[derive(Debug, Default)]
pub struct FinalizeSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ConfigError)>,
}

impl FinalizeSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Collapse into a result carrying the first failure.
    pub fn into_result(self) -> Result<(), ConfigError> {
        match self.failed.into_iter().next() {
            None => Ok(()),
            Some((_, error)) => Err(error),
        }
    }
}
