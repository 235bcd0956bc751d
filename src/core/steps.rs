//! Step wiring handed to the external build pipeline.
//!
//! The engine never executes steps. It only records which named steps exist
//! and which prerequisites each one has, so conventions can re-wire the
//! pipeline - most importantly, keeping side-artifact production out of the
//! default `assemble` path while making it a prerequisite of `publish`.

use std::collections::{BTreeMap, BTreeSet};

/// The default "build everything" step.
pub const ASSEMBLE: &str = "assemble";
/// The distribution step; triggers side-artifact production.
pub const PUBLISH: &str = "publish";
/// Produces the bundled-sources side artifact.
pub const PACKAGE_SOURCES: &str = "package-sources";
/// Produces the generated-documentation side artifact.
pub const PACKAGE_DOCS: &str = "package-docs";

/// Named steps and their prerequisite edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepGraph {
    steps: BTreeMap<String, BTreeSet<String>>,
}

impl StepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a step. Idempotent.
    pub fn add(&mut self, name: &str) {
        self.steps.entry(name.to_string()).or_default();
    }

    /// Make `prerequisite` a prerequisite of `step`, declaring both as
    /// needed. Idempotent.
    pub fn wire(&mut self, step: &str, prerequisite: &str) {
        self.add(prerequisite);
        self.steps
            .entry(step.to_string())
            .or_default()
            .insert(prerequisite.to_string());
    }

    /// Remove a prerequisite edge if present.
    pub fn unwire(&mut self, step: &str, prerequisite: &str) {
        if let Some(prereqs) = self.steps.get_mut(step) {
            prereqs.remove(prerequisite);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Direct prerequisites of a step, sorted by name.
    pub fn prerequisites(&self, step: &str) -> Vec<&str> {
        self.steps
            .get(step)
            .map(|p| p.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
