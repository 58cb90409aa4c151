//! Events emitted by `CompiledStateGraph::stream`.
//!
//! A run produces, per node: `TaskStart`, then either `TaskEnd { result: Ok }` followed
//! by `Updates` (and `Route` when the node has conditional edges), or a failing
//! `TaskEnd`. The stream always ends with exactly one `Finished` or `Failed`.

use std::fmt::Debug;

use crate::error::RunError;

/// Streamed event emitted while running a graph.
#[derive(Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// A node is about to run. `step` counts node executions from 1.
    TaskStart { node_id: String, step: usize },
    /// A node finished: `Ok(())` on success, `Err(message)` on failure.
    TaskEnd {
        node_id: String,
        result: Result<(), String>,
    },
    /// State right after `node_id` returned.
    Updates { node_id: String, state: S },
    /// A conditional edge was taken.
    Route {
        from: String,
        label: String,
        to: String,
    },
    /// The run reached END; carries the final state.
    Finished(S),
    /// The run stopped with an error.
    Failed(RunError),
}

impl<S> StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// True for `Finished` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Finished(_) | StreamEvent::Failed(_))
    }
}
