//! Graph node trait: one step in a StateGraph.
//!
//! Receives state `S`, returns the updated `S`. Routing is decided by the edges
//! registered on the graph, not by the node. Agents implement `Node<S>` through the
//! blanket impl in [`crate::traits`].

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;

/// Presence check used by the runner to validate a node's declared inputs.
///
/// Called as `check(&state, field_name)`; returns `true` when the field is present.
pub type FieldCheckFn<S> = Arc<dyn Fn(&S, &str) -> bool + Send + Sync>;

/// One step in a graph: state in, state out.
///
/// `reads` / `writes` declare the state fields the node consumes and produces. When the
/// graph has a field check (`StateGraph::with_field_check`), missing reads fail the run
/// before the node is invoked and missing writes are logged after it returns.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"research"`).
    fn id(&self) -> &str;

    /// Fields that must be present before this node runs.
    fn reads(&self) -> &[&'static str] {
        &[]
    }

    /// Fields this node is responsible for writing.
    fn writes(&self) -> &[&'static str] {
        &[]
    }

    async fn run(&self, state: S) -> Result<S, AgentError>;
}

type StepFn<S> = Arc<dyn Fn(S) -> Result<S, AgentError> + Send + Sync>;

/// Node backed by a synchronous closure. Handy for wiring glue steps and in tests.
pub struct FnNode<S> {
    id: String,
    reads: Vec<&'static str>,
    writes: Vec<&'static str>,
    step: StepFn<S>,
}

impl<S> FnNode<S> {
    pub fn new<F>(id: impl Into<String>, step: F) -> Self
    where
        F: Fn(S) -> Result<S, AgentError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            reads: Vec::new(),
            writes: Vec::new(),
            step: Arc::new(step),
        }
    }

    pub fn with_reads(mut self, reads: &[&'static str]) -> Self {
        self.reads = reads.to_vec();
        self
    }

    pub fn with_writes(mut self, writes: &[&'static str]) -> Self {
        self.writes = writes.to_vec();
        self
    }
}

#[async_trait]
impl<S> Node<S> for FnNode<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn reads(&self) -> &[&'static str] {
        &self.reads
    }

    fn writes(&self) -> &[&'static str] {
        &self.writes
    }

    async fn run(&self, state: S) -> Result<S, AgentError> {
        (self.step)(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fn_node_runs_closure_and_exposes_contract() {
        let node = FnNode::new("inc", |s: i32| Ok(s + 1))
            .with_reads(&["a"])
            .with_writes(&["b"]);
        assert_eq!(node.id(), "inc");
        assert_eq!(node.reads(), &["a"]);
        assert_eq!(node.writes(), &["b"]);
        assert_eq!(node.run(1).await.unwrap(), 2);
    }
}
