//! Artifact-assembly (shading) convention.
//!
//! Produces the merge instruction for the external archive-merge tool: one
//! combined artifact named deterministically from module identity and
//! version, carrying a classifier that distinguishes it from the unmerged
//! default artifact. Only declared references are merged; everything else
//! stays an external dependency of the output. Merge order is declaration
//! order, a stable total order, so unchanged inputs reproduce the same
//! instruction byte for byte.

use serde::Serialize;

use crate::conventions::toolchain::TOOLCHAIN;
use crate::conventions::{Convention, ConventionId};
use crate::core::{DependencyRef, Module};
use crate::util::errors::ConfigError;
use crate::util::hash::Fingerprint;

/// Convention id of [`ShadeConvention`].
pub const SHADE: ConventionId = "shade";

const REQUIRES: &[ConventionId] = &[TOOLCHAIN];

/// The merge instruction handed to the external merge tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSpec {
    /// `<module>-<version>.<ext>`
    pub archive_file_name: String,
    /// Marks the merged variant of the artifact.
    pub classifier: String,
    /// References to merge, in declaration order.
    pub includes: Vec<DependencyRef>,
}

impl MergeSpec {
    /// Stable digest over the instruction, for reproducibility checks:
    /// identical inputs yield identical fingerprints.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.push(&self.archive_file_name).push(&self.classifier);
        for include in &self.includes {
            fp.push(&include.to_string());
        }
        fp.finish()
    }

    /// Serialize for handing to the external merge tool.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::External(e.into()))
    }
}

/// Computes the merged artifact's deterministic name and include list.
#[derive(Debug, Clone)]
pub struct ShadeConvention {
    classifier: String,
    extension: String,
}

impl ShadeConvention {
    pub fn new() -> Self {
        ShadeConvention {
            classifier: "plugin".to_string(),
            extension: "jar".to_string(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for ShadeConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl Convention for ShadeConvention {
    fn id(&self) -> ConventionId {
        SHADE
    }

    fn requires(&self) -> &[ConventionId] {
        REQUIRES
    }

    fn finalize(&self, module: &mut Module) -> Result<(), ConfigError> {
        let spec = MergeSpec {
            archive_file_name: format!(
                "{}-{}.{}",
                module.name(),
                module.version(),
                self.extension
            ),
            classifier: self.classifier.clone(),
            includes: module.merge_includes().to_vec(),
        };
        tracing::debug!(
            module = module.name(),
            archive = %spec.archive_file_name,
            fingerprint = %spec.fingerprint(),
            "computed merge instruction"
        );
        module.set_merge_spec(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::ToolchainConvention;
    use std::sync::Arc;

    fn shaded_module(name: &str, version: &str) -> Module {
        let mut module = Module::new(name, version);
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module.apply(Arc::new(ShadeConvention::new())).unwrap();
        module
            .declare_merge_include(DependencyRef::project("enterprise-bukkit"))
            .unwrap();
        module
            .declare_merge_include(DependencyRef::external(
                "com.github.Revxrsal.Lamp:common:3.1.7",
            ))
            .unwrap();
        module
    }

    #[test]
    fn test_deterministic_archive_name() {
        let mut module = shaded_module("plugin", "2.0.0");
        module.finalize().unwrap();
        let spec = module.merge_spec().unwrap();
        assert_eq!(spec.archive_file_name, "plugin-2.0.0.jar");
        assert_eq!(spec.classifier, "plugin");
    }

    #[test]
    fn test_merge_order_is_declaration_order() {
        let mut module = shaded_module("plugin", "2.0.0");
        module.finalize().unwrap();
        let spec = module.merge_spec().unwrap();
        assert_eq!(
            spec.includes,
            vec![
                DependencyRef::project("enterprise-bukkit"),
                DependencyRef::external("com.github.Revxrsal.Lamp:common:3.1.7"),
            ]
        );
    }

    #[test]
    fn test_same_inputs_reproduce_the_same_instruction() {
        let mut first = shaded_module("plugin", "2.0.0");
        first.finalize().unwrap();
        let mut second = shaded_module("plugin", "2.0.0");
        second.finalize().unwrap();

        assert_eq!(first.merge_spec(), second.merge_spec());
        assert_eq!(
            first.merge_spec().unwrap().fingerprint(),
            second.merge_spec().unwrap().fingerprint()
        );
    }

    #[test]
    fn test_different_includes_change_the_fingerprint() {
        let mut a = shaded_module("plugin", "2.0.0");
        a.finalize().unwrap();

        let mut b = Module::new("plugin", "2.0.0");
        b.apply(Arc::new(ToolchainConvention::new())).unwrap();
        b.apply(Arc::new(ShadeConvention::new())).unwrap();
        b.finalize().unwrap();

        assert_ne!(
            a.merge_spec().unwrap().fingerprint(),
            b.merge_spec().unwrap().fingerprint()
        );
    }

    #[test]
    fn test_custom_classifier_and_extension() {
        let mut module = Module::new("bundle", "1.1.0");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module
            .apply(Arc::new(
                ShadeConvention::new()
                    .with_classifier("all")
                    .with_extension("zip"),
            ))
            .unwrap();
        module.finalize().unwrap();
        let spec = module.merge_spec().unwrap();
        assert_eq!(spec.archive_file_name, "bundle-1.1.0.zip");
        assert_eq!(spec.classifier, "all");
    }

    #[test]
    fn test_merge_spec_serializes_for_the_merge_tool() {
        let mut module = shaded_module("plugin", "2.0.0");
        module.finalize().unwrap();
        let json = module.merge_spec().unwrap().to_json().unwrap();
        assert!(json.contains("plugin-2.0.0.jar"));
        assert!(json.contains("enterprise-bukkit"));
    }
}
