//! State graph: nodes, fixed and conditional edges, compile, invoke/stream.
//!
//! Build a [`StateGraph`], register nodes and edges, then [`StateGraph::compile`] it
//! into an immutable [`CompiledStateGraph`]. One run walks the graph one node at a
//! time, passing the whole state from node to node.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod node;
mod retry;
mod run_config;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{
    BranchUpdateFn, ConditionalRouter, ConditionalRouterFn, NextEntry, RouteDecision,
};
pub use node::{FieldCheckFn, FnNode, Node};
pub use retry::RetryPolicy;
pub use run_config::RunConfig;
pub use state_graph::{StateGraph, DEFAULT_STEP_LIMIT, END, START};
pub use visualization::{generate_dot, generate_mermaid};
