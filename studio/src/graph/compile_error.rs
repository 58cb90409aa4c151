//! Graph construction error.
//!
//! Returned by `StateGraph` registration methods and by `StateGraph::compile` when the
//! graph is misconfigured. All of these are raised before any run starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilationError {
    /// `add_node` was called twice with the same id.
    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    /// `START` / `END` cannot be used as node ids.
    #[error("reserved node name: {0}")]
    ReservedName(String),

    /// An edge, entry point, or conditional source references an unregistered node.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No entry point was set.
    #[error("graph has no entry point")]
    MissingEntry,

    /// A second, different entry point was set.
    #[error("entry point already set to '{current}', refusing '{requested}'")]
    InvalidEntry { current: String, requested: String },

    /// A registered node has no outgoing edge; the walk could not continue from it.
    #[error("node has no outgoing edge: {0}")]
    MissingExit(String),

    /// A node already has an unconditional outgoing edge.
    #[error("node already has an outgoing edge: {0}")]
    DuplicateEdge(String),

    /// A node has both an outgoing edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A target in a conditional path map is not a registered node or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// A conditional path map has no labels.
    #[error("conditional path_map of '{0}' is empty")]
    EmptyPathMap(String),

    /// A branch update names a label the source's path map does not contain.
    #[error("unknown branch label '{label}' on node '{source_id}'")]
    UnknownBranchLabel { source_id: String, label: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of NodeNotFound contains "node not found" and the node id.
    #[test]
    fn compilation_error_display_node_not_found() {
        let s = CompilationError::NodeNotFound("x".to_string()).to_string();
        assert!(s.contains("node not found"), "{}", s);
        assert!(s.contains("x"), "{}", s);
    }

    /// **Scenario**: Display of InvalidEntry names both entries.
    #[test]
    fn compilation_error_display_invalid_entry() {
        let s = CompilationError::InvalidEntry {
            current: "a".into(),
            requested: "b".into(),
        }
        .to_string();
        assert!(s.contains("'a'") && s.contains("'b'"), "{}", s);
    }
}
