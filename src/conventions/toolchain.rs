//! Base toolchain convention.
//!
//! The foundation every other convention builds on: declarative compiler
//! settings (language level, source encoding - passed through verbatim to
//! the external toolchain), the default repositories, and the compile-only
//! annotations dependency.

use crate::catalog;
use crate::conventions::{Convention, ConventionId};
use crate::core::{DependencyRef, Module, Scope, ToolchainOptions};
use crate::util::errors::ConfigError;

/// Convention id of [`ToolchainConvention`].
pub const TOOLCHAIN: ConventionId = "toolchain";

/// Applies language level, encoding, default repositories, and the
/// annotations dependency. Everything happens in the eager phase; there is
/// no deferred behavior.
#[derive(Debug, Clone)]
pub struct ToolchainConvention {
    language_level: u32,
    encoding: String,
}

impl ToolchainConvention {
    pub fn new() -> Self {
        ToolchainConvention {
            language_level: 8,
            encoding: "UTF-8".to_string(),
        }
    }

    pub fn with_language_level(mut self, level: u32) -> Self {
        self.language_level = level;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

impl Default for ToolchainConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl Convention for ToolchainConvention {
    fn id(&self) -> ConventionId {
        TOOLCHAIN
    }

    fn register(&self, module: &mut Module) -> Result<(), ConfigError> {
        module.set_toolchain_options(ToolchainOptions {
            language_level: Some(self.language_level),
            encoding: Some(self.encoding.clone()),
        })?;
        module.repositories().register(catalog::MAVEN_CENTRAL.clone());
        module.repositories().register(catalog::MAVEN_LOCAL.clone());
        module.add_dependency(
            Scope::CompileOnly,
            DependencyRef::external(catalog::ANNOTATIONS.notation()),
        )
    }

    fn finalize(&self, _module: &mut Module) -> Result<(), ConfigError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_registers_defaults_eagerly() {
        let mut module = Module::new("enterprise-api", "2.0.0");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();

        assert_eq!(module.toolchain().language_level, Some(8));
        assert_eq!(module.toolchain().encoding.as_deref(), Some("UTF-8"));
        assert!(module.repositories().contains("central"));
        assert!(module.repositories().contains("local"));
        assert!(module
            .dependencies()
            .with_scope(Scope::CompileOnly)
            .any(|e| e.reference == DependencyRef::external("org.jetbrains:annotations:24.0.1")));
    }

    #[test]
    fn test_options_are_configurable() {
        let mut module = Module::new("enterprise-api", "2.0.0");
        module
            .apply(Arc::new(
                ToolchainConvention::new()
                    .with_language_level(17)
                    .with_encoding("ISO-8859-1"),
            ))
            .unwrap();
        assert_eq!(module.toolchain().language_level, Some(17));
        assert_eq!(module.toolchain().encoding.as_deref(), Some("ISO-8859-1"));
    }
}
