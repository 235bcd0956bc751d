//! Configuration-time error taxonomy.
//!
//! Every error this crate raises is a configuration error: it fires during
//! module configuration or finalization, before any artifact is produced.
//! An error aborts the finalization of the offending module only; sibling
//! modules are unaffected.

use miette::Diagnostic;
use thiserror::Error;

use crate::conventions::ConventionId;

/// Errors raised while configuring or finalizing a module.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// A convention was applied before one of its declared prerequisites.
    #[error("convention `{requirement}` must be applied to module `{module}` before `{convention}`")]
    #[diagnostic(
        code(shipwright::conventions::missing_prerequisite),
        help("apply `{requirement}` to the module first")
    )]
    MissingPrerequisite {
        module: String,
        convention: ConventionId,
        requirement: ConventionId,
    },

    /// Mutation or finalization attempted after the module was finalized.
    #[error("module `{module}` is already finalized")]
    #[diagnostic(code(shipwright::conventions::already_finalized))]
    AlreadyFinalized { module: String },

    /// The prerequisite graph of the applied conventions is not acyclic.
    #[error("convention ordering cycle in module `{module}` involving `{convention}`")]
    #[diagnostic(code(shipwright::conventions::cycle))]
    ConventionCycle {
        module: String,
        convention: ConventionId,
    },

    /// The platform-binding convention finalized without a selected target.
    #[error("no platform target selected for module `{module}`")]
    #[diagnostic(
        code(shipwright::platform::missing_target),
        help("select a target with `Module::set_platform` or `platform = \"...\"` in the module manifest")
    )]
    MissingTarget { module: String },

    /// Publication assembly found the description unset, or equal to the
    /// root placeholder.
    #[error("set the description of module `{module}` before activating publishing")]
    #[diagnostic(code(shipwright::publish::missing_description))]
    MissingDescription { module: String },

    /// A property the publication requires is not set on the module.
    #[error("module `{module}` is missing required property `{key}`")]
    #[diagnostic(code(shipwright::publish::missing_property))]
    MissingProperty { module: String, key: String },

    /// Signing was requested with malformed or partially-specified
    /// credentials.
    #[error("invalid signing credential for module `{module}`: {reason}")]
    #[diagnostic(
        code(shipwright::publish::invalid_signing_credential),
        help("supply both the passphrase property and a well-formed base64 key property, or neither")
    )]
    InvalidSigningCredential { module: String, reason: String },

    /// A manifest named a platform target the catalog does not know.
    #[error("unknown platform target `{name}`")]
    #[diagnostic(code(shipwright::config::unknown_target))]
    UnknownTarget { name: String },

    /// Error from an external collaborator (dependency resolver, merge tool,
    /// signing backend), propagated unchanged.
    #[error(transparent)]
    #[diagnostic(code(shipwright::external))]
    External(#[from] anyhow::Error),
}
