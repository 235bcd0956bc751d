//! Platform-binding convention.
//!
//! Binds a module to its selected [`Target`](crate::core::Target) at
//! finalization: registers the target dependency's repository (at most
//! once, via set-level de-duplication), adds the dependency at API scope,
//! and derives the module description from the target name. Deferred so
//! the composition root can select the target at any point before
//! finalization.

use crate::conventions::toolchain::TOOLCHAIN;
use crate::conventions::{Convention, ConventionId};
use crate::core::{DependencyRef, Module, Scope};
use crate::util::errors::ConfigError;

/// Convention id of [`PlatformConvention`].
pub const PLATFORM: ConventionId = "platform";

/// Default description template; `{name}` is replaced by the target name.
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str = "{name} platform implementation for Enterprise";

const REQUIRES: &[ConventionId] = &[TOOLCHAIN];

/// Resolves the module's selected target into a repository, an API
/// dependency, and a description.
#[derive(Debug, Clone)]
pub struct PlatformConvention {
    description_template: String,
}

impl PlatformConvention {
    pub fn new() -> Self {
        PlatformConvention {
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
        }
    }

    /// Override the description template. `{name}` expands to the target
    /// name.
    pub fn with_description_template(mut self, template: impl Into<String>) -> Self {
        self.description_template = template.into();
        self
    }
}

impl Default for PlatformConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl Convention for PlatformConvention {
    fn id(&self) -> ConventionId {
        PLATFORM
    }

    fn requires(&self) -> &[ConventionId] {
        REQUIRES
    }

    fn finalize(&self, module: &mut Module) -> Result<(), ConfigError> {
        let target = module
            .platform()
            .cloned()
            .ok_or_else(|| ConfigError::MissingTarget {
                module: module.name().to_string(),
            })?;

        if let Some(action) = target.dependency().repository() {
            action.run(module.repositories());
        }
        module.add_dependency(
            Scope::Api,
            DependencyRef::external(target.dependency().notation()),
        )?;
        module.set_description(self.description_template.replace("{name}", target.name()))
    }
}
