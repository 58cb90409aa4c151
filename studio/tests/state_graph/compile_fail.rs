//! StateGraph construction errors, raised before any run.

use std::collections::HashMap;
use std::sync::Arc;

use studio::{CompilationError, StateGraph, END, START};

use crate::common::{AddAgent, CounterState};

fn graph_with(ids: &[&'static str]) -> StateGraph<CounterState> {
    let mut graph = StateGraph::<CounterState>::new();
    for id in ids {
        graph.add_node(*id, Arc::new(AddAgent::new(*id, 1))).unwrap();
    }
    graph
}

/// **Scenario**: an edge to an unregistered node is rejected at registration.
#[test]
fn edge_to_unregistered_node_is_rejected() {
    let mut graph = graph_with(&["a"]);
    match graph.add_edge("a", "ghost") {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

#[test]
fn entry_to_unregistered_node_is_rejected() {
    let mut graph = graph_with(&["a"]);
    assert!(matches!(
        graph.add_edge(START, "ghost"),
        Err(CompilationError::NodeNotFound(_))
    ));
}

#[test]
fn duplicate_node_is_rejected() {
    let mut graph = graph_with(&["a"]);
    assert!(matches!(
        graph.add_node("a", Arc::new(AddAgent::new("a", 2))),
        Err(CompilationError::DuplicateNode(_))
    ));
}

#[test]
fn conditional_target_must_exist() {
    let mut graph = graph_with(&["a"]);
    let map: HashMap<String, String> = [("x".to_string(), "ghost".to_string())].into();
    assert!(matches!(
        graph.add_conditional_edges("a", Arc::new(|_: &CounterState| "x".to_string()), map),
        Err(CompilationError::InvalidConditionalPathMap(id)) if id == "ghost"
    ));
}

/// **Scenario**: compile refuses a graph with no entry point or a node with no way out.
#[test]
fn compile_checks_entry_and_exits() {
    let mut no_entry = graph_with(&["a"]);
    no_entry.add_edge("a", END).unwrap();
    assert!(matches!(no_entry.compile(), Err(CompilationError::MissingEntry)));

    let mut dangling = graph_with(&["a", "b"]);
    dangling
        .set_entry_point("a")
        .unwrap()
        .add_edge("a", END)
        .unwrap();
    assert!(matches!(
        dangling.compile(),
        Err(CompilationError::MissingExit(id)) if id == "b"
    ));
}
