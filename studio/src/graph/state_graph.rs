//! State graph builder: named nodes, fixed edges, conditional edges, entry point.
//!
//! Registration methods validate eagerly and return `CompilationError` as soon as a
//! call references something that does not exist, so a misconfigured pipeline fails
//! before any run starts. `compile` checks the remaining whole-graph properties
//! (entry set, every node has a way out) and freezes the graph.
//!
//! # Conditional edges
//!
//! After the source node runs, the router is called with the updated state; its label
//! is looked up in the path map. Labels can carry a branch update (`add_branch_update`)
//! that the runner applies before moving to the target.
//!
//! ```rust
//! use std::sync::Arc;
//! use studio::graph::{FnNode, StateGraph, END};
//!
//! # fn main() -> Result<(), studio::graph::CompilationError> {
//! let mut graph = StateGraph::<i32>::new();
//! graph
//!     .add_node("double", Arc::new(FnNode::new("double", |s: i32| Ok(s * 2))))?
//!     .set_entry_point("double")?
//!     .add_conditional_edges(
//!         "double",
//!         Arc::new(|s: &i32| if *s < 100 { "again".into() } else { "done".into() }),
//!         [("again".into(), "double".into()), ("done".into(), END.into())].into(),
//!     )?;
//! let compiled = graph.compile()?;
//! # let _ = compiled;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{
    BranchUpdateFn, ConditionalRouter, ConditionalRouterFn, NextEntry,
};
use crate::graph::node::{FieldCheckFn, Node};
use crate::graph::retry::RetryPolicy;

/// Sentinel for graph entry: `add_edge(START, first)` is the same as `set_entry_point(first)`.
pub const START: &str = "__start__";

/// Terminal sentinel: reaching it ends the run.
pub const END: &str = "__end__";

/// Default number of node executions allowed per run.
pub const DEFAULT_STEP_LIMIT: usize = 50;

/// State graph: nodes plus explicit edges and conditional edges. Generic over state `S`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Registration order, kept for deterministic rendering.
    node_order: Vec<String>,
    entry: Option<String>,
    edges: HashMap<String, String>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    retry_policy: RetryPolicy,
    field_check: Option<FieldCheckFn<S>>,
    step_limit: usize,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            entry: None,
            edges: HashMap::new(),
            conditional_edges: HashMap::new(),
            retry_policy: RetryPolicy::None,
            field_check: None,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Retry policy applied to nodes failing with a transient error.
    pub fn with_retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            retry_policy,
            ..self
        }
    }

    /// Enables validation of each node's declared reads (and writes) against the state.
    pub fn with_field_check(self, check: FieldCheckFn<S>) -> Self {
        Self {
            field_check: Some(check),
            ..self
        }
    }

    /// Maximum number of node executions per run; exceeding it fails with `StepLimitExceeded`.
    pub fn with_step_limit(self, step_limit: usize) -> Self {
        Self { step_limit, ..self }
    }

    /// Registers a node under `id`. The id is what edges and routers refer to; the same
    /// node implementation may be registered under several ids.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        node: Arc<dyn Node<S>>,
    ) -> Result<&mut Self, CompilationError> {
        let id = id.into();
        if id == START || id == END {
            return Err(CompilationError::ReservedName(id));
        }
        if self.nodes.contains_key(&id) {
            return Err(CompilationError::DuplicateNode(id));
        }
        self.node_order.push(id.clone());
        self.nodes.insert(id, node);
        Ok(self)
    }

    /// Designates the start node.
    pub fn set_entry_point(&mut self, id: impl Into<String>) -> Result<&mut Self, CompilationError> {
        let id = id.into();
        if !self.nodes.contains_key(&id) {
            return Err(CompilationError::NodeNotFound(id));
        }
        match &self.entry {
            Some(current) if *current != id => Err(CompilationError::InvalidEntry {
                current: current.clone(),
                requested: id,
            }),
            _ => {
                self.entry = Some(id);
                Ok(self)
            }
        }
    }

    /// Adds an unconditional edge. `to` may be `END`; `from == START` sets the entry point.
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<&mut Self, CompilationError> {
        let (from, to) = (from.into(), to.into());
        if from == START {
            return self.set_entry_point(to);
        }
        if !self.nodes.contains_key(&from) {
            return Err(CompilationError::NodeNotFound(from));
        }
        if to != END && !self.nodes.contains_key(&to) {
            return Err(CompilationError::NodeNotFound(to));
        }
        if self.conditional_edges.contains_key(&from) {
            return Err(CompilationError::NodeHasBothEdgeAndConditional(from));
        }
        if self.edges.contains_key(&from) {
            return Err(CompilationError::DuplicateEdge(from));
        }
        self.edges.insert(from, to);
        Ok(self)
    }

    /// Adds conditional edges from `source`: after it runs, `path(state)` yields a label
    /// looked up in `path_map` (label → node id or `END`). A label missing from the map
    /// fails the run with `RunError::UnknownLabel`.
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: HashMap<String, String>,
    ) -> Result<&mut Self, CompilationError> {
        let source = source.into();
        if !self.nodes.contains_key(&source) {
            return Err(CompilationError::NodeNotFound(source));
        }
        if self.edges.contains_key(&source) {
            return Err(CompilationError::NodeHasBothEdgeAndConditional(source));
        }
        if self.conditional_edges.contains_key(&source) {
            return Err(CompilationError::DuplicateEdge(source));
        }
        if path_map.is_empty() {
            return Err(CompilationError::EmptyPathMap(source));
        }
        if let Some(bad) = path_map
            .values()
            .find(|target| target.as_str() != END && !self.nodes.contains_key(target.as_str()))
        {
            return Err(CompilationError::InvalidConditionalPathMap(bad.clone()));
        }
        self.conditional_edges
            .insert(source, ConditionalRouter::new(path, path_map));
        Ok(self)
    }

    /// Registers the state update applied when `source`'s router picks `label`.
    pub fn add_branch_update(
        &mut self,
        source: &str,
        label: impl Into<String>,
        update: BranchUpdateFn<S>,
    ) -> Result<&mut Self, CompilationError> {
        let label = label.into();
        let router = self
            .conditional_edges
            .get_mut(source)
            .ok_or_else(|| CompilationError::NodeNotFound(source.to_string()))?;
        if !router.has_label(&label) {
            return Err(CompilationError::UnknownBranchLabel {
                source_id: source.to_string(),
                label,
            });
        }
        router.updates.insert(label, update);
        Ok(self)
    }

    /// Validates the whole graph and freezes it for execution.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        let entry = self.entry.ok_or(CompilationError::MissingEntry)?;
        if let Some(dangling) = self
            .node_order
            .iter()
            .find(|id| !self.edges.contains_key(*id) && !self.conditional_edges.contains_key(*id))
        {
            return Err(CompilationError::MissingExit(dangling.clone()));
        }

        let mut next_map: HashMap<String, NextEntry<S>> = self
            .edges
            .into_iter()
            .map(|(from, to)| (from, NextEntry::Unconditional(to)))
            .collect();
        for (source, router) in self.conditional_edges {
            next_map.insert(source, NextEntry::Conditional(router));
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            node_order: self.node_order,
            entry,
            next_map,
            retry_policy: self.retry_policy,
            field_check: self.field_check,
            step_limit: self.step_limit,
        })
    }
}
