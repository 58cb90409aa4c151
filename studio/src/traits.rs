//! Minimal agent trait: state in, state out.
//!
//! When `Agent::State == S`, an agent can be used as a graph `Node<S>` (see blanket impl below).

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;

/// One unit of pipeline work: receive state, return updated state.
///
/// Agents read their inputs from the state, make (at most) one call to the
/// text-generation service and write their output field(s). `reads` and `writes`
/// name those fields so the graph runner can check inputs before the call.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Display name of the agent (e.g. "research", "edit_script").
    fn name(&self) -> &str;

    /// State type for this agent.
    type State: Clone + Send + Sync + Debug + 'static;

    /// State fields that must be present before `run`.
    fn reads(&self) -> &[&'static str] {
        &[]
    }

    /// State fields `run` writes.
    fn writes(&self) -> &[&'static str] {
        &[]
    }

    async fn run(&self, state: Self::State) -> Result<Self::State, AgentError>;
}

/// Any agent whose state type is `S` can be used as a graph node.
#[async_trait]
impl<S, A> Node<S> for A
where
    S: Clone + Send + Sync + Debug + 'static,
    A: Agent<State = S> + Send + Sync,
{
    fn id(&self) -> &str {
        self.name()
    }

    fn reads(&self) -> &[&'static str] {
        Agent::reads(self)
    }

    fn writes(&self) -> &[&'static str] {
        Agent::writes(self)
    }

    async fn run(&self, state: S) -> Result<S, AgentError> {
        Agent::run(self, state).await
    }
}
