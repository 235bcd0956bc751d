//! Module manifests.
//!
//! A manifest is the declarative form of a module composition root: the
//! module's identity, its selected platform target, its properties, its
//! dependency declarations, and its shade include lists. Conventions are
//! still applied in code; the manifest supplies the module-specific
//! parameters they consume.
//!
//! ```toml
//! name = "enterprise-bukkit"
//! version = "2.0.0"
//! platform = "bukkit"
//!
//! [properties]
//! url = "https://github.com/the-h-team/Enterprise"
//! inceptionYear = "2020"
//!
//! [[dependencies]]
//! scope = "implementation"
//! project = "enterprise-api"
//!
//! [shade]
//! include-projects = ["enterprise-api"]
//! include-artifacts = ["com.github.Revxrsal.Lamp:common:3.1.7"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::core::{DependencyRef, Module, Scope};
use crate::util::errors::ConfigError;

/// Declarative composition-root parameters for one module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ModuleConfig {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    /// Platform target name, resolved against the built-in catalog.
    pub platform: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<DependencyDecl>,
    pub shade: Option<ShadeSection>,
}

/// One dependency declaration: exactly one of `project` or `notation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyDecl {
    pub scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
}

impl DependencyDecl {
    fn reference(&self) -> Result<DependencyRef> {
        match (&self.project, &self.notation) {
            (Some(project), None) => Ok(DependencyRef::project(project)),
            (None, Some(notation)) => Ok(DependencyRef::external(notation)),
            _ => bail!("dependency declaration needs exactly one of `project` or `notation`"),
        }
    }
}

/// Shade include lists; projects first, then artifacts, each in listed
/// order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ShadeSection {
    pub include_projects: Vec<String>,
    pub include_artifacts: Vec<String>,
}

impl ModuleConfig {
    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read module manifest: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse module manifest: {}", path.display()))
    }

    /// Configure a module with this manifest's parameters.
    pub fn apply_to(&self, module: &mut Module) -> Result<(), ConfigError> {
        if let Some(description) = &self.description {
            module.set_description(description)?;
        }
        if let Some(platform) = &self.platform {
            let target =
                catalog::target_by_name(platform).ok_or_else(|| ConfigError::UnknownTarget {
                    name: platform.clone(),
                })?;
            module.set_platform(target.clone())?;
        }
        for (key, value) in &self.properties {
            module.set_property(key, value)?;
        }
        for declaration in &self.dependencies {
            let reference = declaration.reference()?;
            module.add_dependency(declaration.scope, reference)?;
        }
        if let Some(shade) = &self.shade {
            for project in &shade.include_projects {
                module.declare_merge_include(DependencyRef::project(project))?;
            }
            for artifact in &shade.include_artifacts {
                module.declare_merge_include(DependencyRef::external(artifact))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
name = "enterprise-bukkit"
version = "2.0.0"
platform = "bukkit"

[properties]
url = "https://github.com/the-h-team/Enterprise"
inceptionYear = "2020"

[[dependencies]]
scope = "implementation"
project = "enterprise-api"

[[dependencies]]
scope = "compile-only"
notation = "com.github.MilkBowl:VaultAPI:1.7.1"

[shade]
include-projects = ["enterprise-api"]
include-artifacts = [
    "com.github.Revxrsal.Lamp:common:3.1.7",
    "com.github.Revxrsal.Lamp:bukkit:3.1.7",
]
"#;

    #[test]
    fn test_load_and_apply() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("module.toml");
        std::fs::write(&path, MANIFEST).unwrap();

        let config = ModuleConfig::load(&path).unwrap();
        assert_eq!(config.name, "enterprise-bukkit");

        let mut module = Module::new(&config.name, &config.version);
        config.apply_to(&mut module).unwrap();

        assert_eq!(module.platform().unwrap().name(), "Bukkit");
        assert_eq!(module.property("inceptionYear"), Some("2020"));
        assert_eq!(module.dependencies().entries().len(), 2);
        // Projects first, then artifacts, in listed order.
        assert_eq!(
            module.merge_includes(),
            &[
                DependencyRef::project("enterprise-api"),
                DependencyRef::external("com.github.Revxrsal.Lamp:common:3.1.7"),
                DependencyRef::external("com.github.Revxrsal.Lamp:bukkit:3.1.7"),
            ]
        );
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let config = ModuleConfig {
            name: "m".to_string(),
            version: "1.0.0".to_string(),
            platform: Some("velocity".to_string()),
            ..Default::default()
        };
        let mut module = Module::new("m", "1.0.0");
        let err = config.apply_to(&mut module).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget { .. }));
    }

    #[test]
    fn test_ambiguous_dependency_declaration_is_rejected() {
        let decl = DependencyDecl {
            scope: Scope::Api,
            project: Some("enterprise-api".to_string()),
            notation: Some("g:a:1".to_string()),
        };
        assert!(decl.reference().is_err());
    }

    #[test]
    fn test_missing_manifest_reports_the_path() {
        let err = ModuleConfig::load(Path::new("/nonexistent/module.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/module.toml"));
    }
}
