//! Composable build conventions.
//!
//! A convention is a named, idempotent unit of build configuration attached
//! to a module. Application follows a two-phase protocol:
//!
//! 1. **Registration** (eager, synchronous): [`Module::apply`] records the
//!    convention id and runs [`Convention::register`], which may mutate the
//!    module immediately. Missing hard prerequisites fail here.
//! 2. **Finalization** (deferred, once per module): [`Module::finalize`]
//!    runs every applied convention's [`Convention::finalize`] hook in an
//!    order consistent with the prerequisite graph, ties broken by
//!    application order for determinism.
//!
//! Conventions never need to know about each other; ordering lets them
//! observe each other's side effects (publication assembly reads the
//! archive name that shading produced).
//!
//! [`Module::apply`]: crate::core::Module::apply
//! [`Module::finalize`]: crate::core::Module::finalize

use std::collections::BTreeMap;
use std::sync::Arc;

use petgraph::graph::DiGraph;
use petgraph::Direction;

use crate::core::Module;
use crate::util::errors::ConfigError;

pub mod platform;
pub mod publish;
pub mod shade;
pub mod toolchain;

pub use platform::PlatformConvention;
pub use publish::{Publication, PublishConvention, SigningBackend};
pub use shade::{MergeSpec, ShadeConvention};
pub use toolchain::ToolchainConvention;

/// Identifier of a convention. Conventions are code, so ids are static.
pub type ConventionId = &'static str;

/// A named, composable, idempotent unit of build configuration.
pub trait Convention: Send + Sync {
    /// Stable identifier; applying the same id twice is a no-op.
    fn id(&self) -> ConventionId;

    /// Hard prerequisites: ids that must already be applied to the module
    /// when this convention is applied.
    fn requires(&self) -> &[ConventionId] {
        &[]
    }

    /// Soft ordering: if any of these conventions are applied to the same
    /// module, their deferred hooks run before this one's. Absence is not
    /// an error.
    fn runs_after(&self) -> &[ConventionId] {
        &[]
    }

    /// Eager phase, run at application time. May mutate the module and may
    /// itself depend on nothing having been finalized yet.
    fn register(&self, module: &mut Module) -> Result<(), ConfigError> {
        let _ = module;
        Ok(())
    }

    /// Deferred phase, run exactly once at module finalization, after all
    /// module configuration is known.
    fn finalize(&self, module: &mut Module) -> Result<(), ConfigError>;
}

impl std::fmt::Debug for dyn Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Convention").field("id", &self.id()).finish()
    }
}

/// The conventions applied to one module, in application order.
#[derive(Clone, Default)]
pub struct ConventionSet {
    applied: Vec<Arc<dyn Convention>>,
}

impl ConventionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_applied(&self, id: ConventionId) -> bool {
        self.applied.iter().any(|c| c.id() == id)
    }

    /// Applied ids, in application order.
    pub fn ids(&self) -> Vec<ConventionId> {
        self.applied.iter().map(|c| c.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub(crate) fn record(&mut self, convention: Arc<dyn Convention>) {
        self.applied.push(convention);
    }

    /// Compute the deferred execution order: topological over the
    /// prerequisite graph (hard `requires` plus soft `runs_after` edges),
    /// ties broken by application order.
    pub(crate) fn finalize_order(
        &self,
        module_name: &str,
    ) -> Result<Vec<Arc<dyn Convention>>, ConfigError> {
        let count = self.applied.len();
        let position: BTreeMap<ConventionId, usize> = self
            .applied
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id(), i))
            .collect();

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<_> = (0..count).map(|i| graph.add_node(i)).collect();
        for (i, convention) in self.applied.iter().enumerate() {
            // Hard prerequisites were checked at application time, so the
            // lookup cannot miss; soft edges apply only when present.
            for requirement in convention.requires() {
                if let Some(&j) = position.get(requirement) {
                    graph.add_edge(nodes[j], nodes[i], ());
                }
            }
            for predecessor in convention.runs_after() {
                if let Some(&j) = position.get(predecessor) {
                    graph.add_edge(nodes[j], nodes[i], ());
                }
            }
        }

        // Kahn's algorithm, always emitting the earliest-applied ready
        // convention so the order is deterministic.
        let mut indegree: Vec<usize> = nodes
            .iter()
            .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut emitted = vec![false; count];
        let mut order = Vec::with_capacity(count);
        while order.len() < count {
            let Some(next) = (0..count).find(|&i| !emitted[i] && indegree[i] == 0) else {
                let stuck = (0..count)
                    .find(|&i| !emitted[i])
                    .map(|i| self.applied[i].id())
                    .unwrap_or("?");
                return Err(ConfigError::ConventionCycle {
                    module: module_name.to_string(),
                    convention: stuck,
                });
            };
            emitted[next] = true;
            order.push(Arc::clone(&self.applied[next]));
            for neighbor in graph.neighbors_directed(nodes[next], Direction::Outgoing) {
                indegree[graph[neighbor]] -= 1;
            }
        }
        Ok(order)
    }
}
