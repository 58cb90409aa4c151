//! Error types for agents, LLM calls and graph runs.
//!
//! Three layers: `LlmError` (one text-generation call), `AgentError` (one node step),
//! `RunError` (a whole graph walk, always naming the node involved). Build-time graph
//! errors live in [`crate::graph::CompilationError`].

use std::time::Duration;

use thiserror::Error;

/// Failure of one call to the text-generation service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The call did not return within the configured per-call timeout.
    #[error("llm call timed out after {0:?}")]
    Timeout(Duration),

    /// A failure that may clear on its own: network errors, rate limits, server errors.
    #[error("llm api error: {0}")]
    Api(String),

    /// The provider refused the call (invalid key, invalid request) or its reply could
    /// not be decoded. Repeating the same call gives the same answer.
    #[error("llm request rejected: {0}")]
    Rejected(String),

    /// The provider answered without any choice/content.
    #[error("llm returned no content")]
    EmptyResponse,

    /// The request could not be built (invalid model name, bad arguments).
    #[error("llm request build failed: {0}")]
    RequestBuild(String),
}

impl LlmError {
    /// Timeouts and `Api` errors may succeed when retried; rejected or malformed requests will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Timeout(_) | LlmError::Api(_))
    }
}

/// Agent (node) execution error.
///
/// Returned by `Agent::run` / `Node::run` when a step fails.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A field the node requires is absent from the shared state.
    #[error("missing required state field: {0}")]
    MissingField(String),

    /// The text-generation call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Execution failed with a message.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl AgentError {
    pub fn missing(field: impl Into<String>) -> Self {
        AgentError::MissingField(field.into())
    }

    /// Whether re-running the node may succeed. Only LLM timeouts and `LlmError::Api` qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            AgentError::Llm(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Error from running a compiled graph.
///
/// Every variant that can be attributed to a node carries its id, so callers can
/// surface which step failed.
#[derive(Debug, Error)]
pub enum RunError {
    /// A node's transform failed.
    #[error("node '{node_id}' failed: {source}")]
    Node {
        node_id: String,
        #[source]
        source: AgentError,
    },

    /// A conditional router returned a label with no entry in its path map.
    #[error("router of node '{node_id}' returned unknown label '{label}'")]
    UnknownLabel { node_id: String, label: String },

    /// The walk would execute more nodes than the step budget allows.
    #[error("step limit of {limit} exceeded at node '{node_id}'")]
    StepLimitExceeded { limit: usize, node_id: String },

    /// The run was cancelled through its cancellation token.
    #[error("run cancelled at node '{node_id}'")]
    Cancelled { node_id: String },

    /// The graph has no runnable entry node.
    #[error("graph has no entry node")]
    EmptyGraph,
}

impl RunError {
    /// Node id the error is attributed to, when there is one.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            RunError::Node { node_id, .. }
            | RunError::UnknownLabel { node_id, .. }
            | RunError::StepLimitExceeded { node_id, .. }
            | RunError::Cancelled { node_id } => Some(node_id),
            RunError::EmptyGraph => None,
        }
    }
}
