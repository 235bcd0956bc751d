//! Shipwright - declarative convention composition for multi-platform
//! plugin builds.
//!
//! A project describes, once, which external dependencies each platform
//! target needs (including the repositories they live in) and which
//! cross-cutting build behaviors apply across modules. Each module then
//! opts into exactly the conventions it needs:
//!
//! - [`ToolchainConvention`]: compiler settings, default repositories.
//! - [`PlatformConvention`]: lazily binds the module's selected target.
//! - [`ShadeConvention`]: deterministic merged-artifact instruction.
//! - [`PublishConvention`]: publication assembly and optional signing.
//!
//! Conventions register cheaply and synchronously; their deferred hooks
//! run once per module at finalization, ordered by the prerequisite graph.
//! All errors are configuration-time and module-isolated.

pub mod catalog;
pub mod config;
pub mod conventions;
pub mod core;
pub mod session;
pub mod util;

pub use config::ModuleConfig;
pub use conventions::{
    Convention, ConventionId, MergeSpec, PlatformConvention, Publication, PublishConvention,
    ShadeConvention, SigningBackend, ToolchainConvention,
};
pub use crate::core::{
    Dependency, DependencyRef, Module, Repository, RepositoryAction, RepositorySet, Scope, Target,
};
pub use session::{BuildSession, FinalizeSummary};
pub use util::errors::ConfigError;
