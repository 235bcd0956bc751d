//! Core data model.
//!
//! The foundational types of the engine:
//! - immutable artifact coordinates and their lazy repository hooks
//! - named repositories and the de-duplicated repository set
//! - platform targets
//! - the per-module composition root and its step wiring

pub mod dependency;
pub mod module;
pub mod repository;
pub mod steps;
pub mod target;

pub use dependency::Dependency;
pub use module::{DependencyEntry, DependencyRef, DependencySet, Module, Scope, ToolchainOptions};
pub use repository::{ContentFilter, Repository, RepositoryAction, RepositorySet};
pub use steps::StepGraph;
pub use target::Target;
