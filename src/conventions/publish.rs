//! Publication-assembly convention.
//!
//! Assembles the distributable package record: binary artifact (the shaded
//! name when a merge instruction exists), optional bundled-sources and
//! generated-documentation side artifacts, and the project metadata block.
//! Side-artifact production is deliberately kept out of the default
//! `assemble` path and wired as a prerequisite of `publish` only, so a
//! plain build never pays its cost.
//!
//! Signing is driven by property presence: no passphrase property means an
//! unsigned publication and no error; a passphrase with missing or
//! malformed base64 key material is fatal. The cryptographic work itself
//! belongs to the external [`SigningBackend`].

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use crate::conventions::platform::PLATFORM;
use crate::conventions::shade::SHADE;
use crate::conventions::toolchain::TOOLCHAIN;
use crate::conventions::{Convention, ConventionId};
use crate::core::steps::{ASSEMBLE, PACKAGE_DOCS, PACKAGE_SOURCES, PUBLISH as PUBLISH_STEP};
use crate::core::Module;
use crate::util::errors::ConfigError;

/// Convention id of [`PublishConvention`].
pub const PUBLISH: ConventionId = "publish";

/// Property holding the signing passphrase; its presence requests signing.
pub const PASSPHRASE_PROPERTY: &str = "signingKeyPassphrase";
/// Property holding the base64-encoded in-memory signing key.
pub const SIGNING_KEY_PROPERTY: &str = "base64SigningKey";
/// Required publication property: project URL.
pub const URL_PROPERTY: &str = "url";
/// Required publication property: project inception year.
pub const INCEPTION_YEAR_PROPERTY: &str = "inceptionYear";

const REQUIRES: &[ConventionId] = &[TOOLCHAIN];
// Publication must observe the shaded artifact name and the bound
// description, when those conventions are present.
const RUNS_AFTER: &[ConventionId] = &[SHADE, PLATFORM];

/// License entry of the publication metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    pub name: String,
    pub url: String,
    pub distribution: String,
}

/// Organization entry of the publication metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub name: String,
    pub url: String,
}

/// Developer entry of the publication metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Developer {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Source-control links of the publication metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceControl {
    pub connection: String,
    pub developer_connection: String,
    pub url: String,
}

/// The fixed metadata block attached to every publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectMetadata {
    pub license: License,
    pub organization: Organization,
    pub developers: Vec<Developer>,
    pub scm: SourceControl,
}

/// What an artifact contributes to the publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Binary,
    Sources,
    Docs,
}

/// One file of the publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub classifier: Option<String>,
    pub kind: ArtifactKind,
}

/// A detached signature produced by the external signing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// File the signature covers.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// The packaged, metadata-annotated, optionally signed distributable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub module: String,
    pub version: String,
    pub description: String,
    pub url: String,
    pub inception_year: String,
    pub metadata: ProjectMetadata,
    pub artifacts: Vec<Artifact>,
    pub signatures: Vec<Signature>,
}

impl Publication {
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Serialize for handing to the external publishing pipeline.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::External(e.into()))
    }
}

/// External signing backend: receives decoded key material, the
/// passphrase, and the artifact list; performs the cryptographic
/// signature. Errors propagate unchanged.
pub trait SigningBackend: Send + Sync {
    fn sign(
        &self,
        key: &[u8],
        passphrase: &str,
        artifacts: &[Artifact],
    ) -> anyhow::Result<Vec<Signature>>;
}

/// Assembles and optionally signs the module's publication.
pub struct PublishConvention {
    metadata: ProjectMetadata,
    sources: bool,
    docs: bool,
    signer: Option<Arc<dyn SigningBackend>>,
}

impl PublishConvention {
    pub fn new(metadata: ProjectMetadata) -> Self {
        PublishConvention {
            metadata,
            sources: true,
            docs: true,
            signer: None,
        }
    }

    /// Install the external signing backend used when credentials are
    /// present.
    pub fn with_signer(mut self, signer: Arc<dyn SigningBackend>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Skip the bundled-sources side artifact.
    pub fn without_sources(mut self) -> Self {
        self.sources = false;
        self
    }

    /// Skip the generated-documentation side artifact.
    pub fn without_docs(mut self) -> Self {
        self.docs = false;
        self
    }

    fn sign_if_requested(
        &self,
        module: &Module,
        artifacts: &[Artifact],
    ) -> Result<Vec<Signature>, ConfigError> {
        let Some(passphrase) = module.property(PASSPHRASE_PROPERTY) else {
            // Absent passphrase means an unsigned publication, not an error.
            return Ok(Vec::new());
        };
        let encoded = module.property(SIGNING_KEY_PROPERTY).ok_or_else(|| {
            ConfigError::InvalidSigningCredential {
                module: module.name().to_string(),
                reason: format!("`{SIGNING_KEY_PROPERTY}` property is not set"),
            }
        })?;
        let key = BASE64
            .decode(encoded)
            .map_err(|e| ConfigError::InvalidSigningCredential {
                module: module.name().to_string(),
                reason: format!("malformed base64 key material: {e}"),
            })?;
        match &self.signer {
            Some(signer) => signer
                .sign(&key, passphrase, artifacts)
                .map_err(ConfigError::External),
            None => {
                tracing::warn!(
                    module = module.name(),
                    "signing credentials present but no signing backend installed; publication left unsigned"
                );
                Ok(Vec::new())
            }
        }
    }
}

impl Convention for PublishConvention {
    fn id(&self) -> ConventionId {
        PUBLISH
    }

    fn requires(&self) -> &[ConventionId] {
        REQUIRES
    }

    fn runs_after(&self) -> &[ConventionId] {
        RUNS_AFTER
    }

    fn register(&self, module: &mut Module) -> Result<(), ConfigError> {
        let steps = module.steps_mut()?;
        steps.add(PACKAGE_SOURCES);
        steps.add(PACKAGE_DOCS);
        // Side artifacts are produced for publishing only, never for a
        // plain build.
        steps.unwire(ASSEMBLE, PACKAGE_SOURCES);
        steps.unwire(ASSEMBLE, PACKAGE_DOCS);
        steps.wire(PUBLISH_STEP, ASSEMBLE);
        steps.wire(PUBLISH_STEP, PACKAGE_SOURCES);
        steps.wire(PUBLISH_STEP, PACKAGE_DOCS);
        Ok(())
    }

    fn finalize(&self, module: &mut Module) -> Result<(), ConfigError> {
        let description = match module.description() {
            Some(d) if module.root_description() != Some(d) => d.to_string(),
            _ => {
                return Err(ConfigError::MissingDescription {
                    module: module.name().to_string(),
                })
            }
        };
        let url = module
            .property(URL_PROPERTY)
            .ok_or_else(|| ConfigError::MissingProperty {
                module: module.name().to_string(),
                key: URL_PROPERTY.to_string(),
            })?
            .to_string();
        let inception_year = module
            .property(INCEPTION_YEAR_PROPERTY)
            .ok_or_else(|| ConfigError::MissingProperty {
                module: module.name().to_string(),
                key: INCEPTION_YEAR_PROPERTY.to_string(),
            })?
            .to_string();

        let (binary_name, binary_classifier) = match module.merge_spec() {
            Some(merge) => (
                merge.archive_file_name.clone(),
                Some(merge.classifier.clone()),
            ),
            None => (format!("{}-{}.jar", module.name(), module.version()), None),
        };

        let mut artifacts = vec![Artifact {
            file_name: binary_name,
            classifier: binary_classifier,
            kind: ArtifactKind::Binary,
        }];
        if self.sources {
            artifacts.push(Artifact {
                file_name: format!("{}-{}-sources.jar", module.name(), module.version()),
                classifier: Some("sources".to_string()),
                kind: ArtifactKind::Sources,
            });
        }
        if self.docs {
            artifacts.push(Artifact {
                file_name: format!("{}-{}-javadoc.jar", module.name(), module.version()),
                classifier: Some("javadoc".to_string()),
                kind: ArtifactKind::Docs,
            });
        }

        let signatures = self.sign_if_requested(module, &artifacts)?;

        module.set_publication(Publication {
            module: module.name().to_string(),
            version: module.version().to_string(),
            description,
            url,
            inception_year,
            metadata: self.metadata.clone(),
            artifacts,
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::conventions::{ShadeConvention, ToolchainConvention};
    use crate::core::steps::StepGraph;

    struct MockSigner;

    impl SigningBackend for MockSigner {
        fn sign(
            &self,
            key: &[u8],
            passphrase: &str,
            artifacts: &[Artifact],
        ) -> anyhow::Result<Vec<Signature>> {
            assert!(!key.is_empty());
            assert!(!passphrase.is_empty());
            Ok(artifacts
                .iter()
                .map(|a| Signature {
                    file_name: format!("{}.asc", a.file_name),
                    data: key.to_vec(),
                })
                .collect())
        }
    }

    fn publishable_module() -> Module {
        let mut module =
            Module::new("enterprise-bukkit", "2.0.0").with_root_description("A build of holdings");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module
            .apply(Arc::new(PublishConvention::new(catalog::project_metadata())))
            .unwrap();
        module.set_description("Bukkit platform implementation").unwrap();
        module
            .set_property(URL_PROPERTY, "https://github.com/the-h-team/Enterprise")
            .unwrap();
        module.set_property(INCEPTION_YEAR_PROPERTY, "2020").unwrap();
        module
    }

    #[test]
    fn test_side_artifacts_wired_to_publish_only() {
        let module = publishable_module();
        let steps: &StepGraph = module.steps();
        assert!(steps.prerequisites(ASSEMBLE).is_empty());
        assert_eq!(
            steps.prerequisites(PUBLISH_STEP),
            vec![ASSEMBLE, PACKAGE_DOCS, PACKAGE_SOURCES]
        );
    }

    #[test]
    fn test_publication_carries_description_and_metadata() {
        let mut module = publishable_module();
        module.finalize().unwrap();
        let publication = module.publication().unwrap();
        assert_eq!(publication.description, "Bukkit platform implementation");
        assert_eq!(publication.inception_year, "2020");
        assert_eq!(publication.metadata.license.name, "Apache License 2.0");
        assert_eq!(publication.artifacts.len(), 3);
        assert_eq!(
            publication.artifacts[0].file_name,
            "enterprise-bukkit-2.0.0.jar"
        );
        assert!(!publication.is_signed());
    }

    #[test]
    fn test_missing_description_is_fatal() {
        let mut module = Module::new("enterprise-bukkit", "2.0.0");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module
            .apply(Arc::new(PublishConvention::new(catalog::project_metadata())))
            .unwrap();
        module
            .set_property(URL_PROPERTY, "https://example.com")
            .unwrap();
        module.set_property(INCEPTION_YEAR_PROPERTY, "2020").unwrap();
        let err = module.finalize().unwrap_err();
        assert!(matches!(err, ConfigError::MissingDescription { .. }));
    }

    #[test]
    fn test_placeholder_description_is_fatal() {
        let mut module = publishable_module();
        module.set_description("A build of holdings").unwrap();
        let err = module.finalize().unwrap_err();
        assert!(matches!(err, ConfigError::MissingDescription { .. }));
    }

    #[test]
    fn test_missing_required_property_names_the_key() {
        let mut module =
            Module::new("enterprise-bukkit", "2.0.0").with_root_description("placeholder");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module
            .apply(Arc::new(PublishConvention::new(catalog::project_metadata())))
            .unwrap();
        module.set_description("Something distinct").unwrap();
        module
            .set_property(URL_PROPERTY, "https://example.com")
            .unwrap();
        let err = module.finalize().unwrap_err();
        match err {
            ConfigError::MissingProperty { key, .. } => {
                assert_eq!(key, INCEPTION_YEAR_PROPERTY)
            }
            other => panic!("expected MissingProperty, got {other:?}"),
        }
    }

    #[test]
    fn test_publication_uses_shaded_artifact_name() {
        let mut module = publishable_module();
        module.apply(Arc::new(ShadeConvention::new())).unwrap();
        module.finalize().unwrap();
        let binary = &module.publication().unwrap().artifacts[0];
        assert_eq!(binary.file_name, "enterprise-bukkit-2.0.0.jar");
        assert_eq!(binary.classifier.as_deref(), Some("plugin"));
    }

    #[test]
    fn test_absent_passphrase_means_unsigned() {
        let mut module = publishable_module();
        module.finalize().unwrap();
        assert!(!module.publication().unwrap().is_signed());
    }

    #[test]
    fn test_signing_with_well_formed_credentials() {
        let mut module =
            Module::new("enterprise-bukkit", "2.0.0").with_root_description("placeholder");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module
            .apply(Arc::new(
                PublishConvention::new(catalog::project_metadata())
                    .with_signer(Arc::new(MockSigner)),
            ))
            .unwrap();
        module.set_description("Signed module").unwrap();
        module
            .set_property(URL_PROPERTY, "https://example.com")
            .unwrap();
        module.set_property(INCEPTION_YEAR_PROPERTY, "2020").unwrap();
        module
            .set_property(PASSPHRASE_PROPERTY, "correct horse")
            .unwrap();
        module
            .set_property(SIGNING_KEY_PROPERTY, BASE64.encode("pgp key material"))
            .unwrap();

        module.finalize().unwrap();
        let publication = module.publication().unwrap();
        assert!(publication.is_signed());
        assert_eq!(publication.signatures.len(), publication.artifacts.len());
        assert_eq!(
            publication.signatures[0].file_name,
            "enterprise-bukkit-2.0.0.jar.asc"
        );
    }

    #[test]
    fn test_credentials_without_backend_leave_unsigned() {
        // Valid credentials, no backend installed: the credentials are
        // still decoded and validated, but the publication stays
        // unsigned and finalization succeeds.
        let mut module = publishable_module();
        module
            .set_property(PASSPHRASE_PROPERTY, "correct horse")
            .unwrap();
        module
            .set_property(SIGNING_KEY_PROPERTY, BASE64.encode("pgp key material"))
            .unwrap();
        module.finalize().unwrap();
        assert!(!module.publication().unwrap().is_signed());
    }

    #[test]
    fn test_passphrase_without_key_material_is_fatal() {
        let mut module = publishable_module();
        module
            .set_property(PASSPHRASE_PROPERTY, "correct horse")
            .unwrap();
        let err = module.finalize().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSigningCredential { .. }));
    }

    #[test]
    fn test_malformed_base64_key_is_fatal() {
        let mut module = publishable_module();
        module
            .set_property(PASSPHRASE_PROPERTY, "correct horse")
            .unwrap();
        module
            .set_property(SIGNING_KEY_PROPERTY, "not valid base64!!!")
            .unwrap();
        let err = module.finalize().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSigningCredential { .. }));
    }

    #[test]
    fn test_side_artifacts_can_be_skipped() {
        let mut module =
            Module::new("enterprise-api", "2.0.0").with_root_description("placeholder");
        module.apply(Arc::new(ToolchainConvention::new())).unwrap();
        module
            .apply(Arc::new(
                PublishConvention::new(catalog::project_metadata())
                    .without_sources()
                    .without_docs(),
            ))
            .unwrap();
        module.set_description("API module").unwrap();
        module
            .set_property(URL_PROPERTY, "https://example.com")
            .unwrap();
        module.set_property(INCEPTION_YEAR_PROPERTY, "2020").unwrap();
        module.finalize().unwrap();
        assert_eq!(module.publication().unwrap().artifacts.len(), 1);
    }
}
