//! Structured logging for graph execution events.

use std::fmt::Debug;

use crate::error::RunError;

pub fn log_node_start(node_id: &str, step: usize) {
    tracing::debug!(node_id = node_id, step = step, "Starting node execution");
}

/// Logs the input state of a node at TRACE (state carries whole scripts).
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str) {
    tracing::debug!(node_id = node_id, "Node execution complete");
}

pub fn log_missing_write(node_id: &str, field: &str) {
    tracing::warn!(
        node_id = node_id,
        field = field,
        "Node finished without writing a declared field"
    );
}

pub fn log_route(from: &str, label: &str, to: &str) {
    tracing::debug!(from = from, label = label, to = to, "conditional routing");
}

pub fn log_graph_start(run_id: &str) {
    tracing::info!(run_id = run_id, "Starting graph execution");
}

pub fn log_graph_complete(steps: usize) {
    tracing::info!(steps = steps, "Graph execution complete");
}

pub fn log_graph_error(error: &RunError) {
    tracing::error!(node_id = ?error.node_id(), %error, "Graph execution error");
}
