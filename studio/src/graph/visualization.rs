//! Graph visualization: Mermaid and Graphviz DOT export of a compiled graph.
//!
//! Output is deterministic: nodes follow registration order, conditional branches are
//! sorted by label. Conditional edges are drawn dashed and labelled.

use std::fmt::Debug;
use std::fmt::Write;

use super::{CompiledStateGraph, NextEntry, END, START};

/// Edges of the graph as `(from, to, label)`, starting with the entry edge.
fn edge_list<S>(graph: &CompiledStateGraph<S>) -> Vec<(String, String, Option<String>)>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut edges = vec![(START.to_string(), graph.entry.clone(), None)];
    for id in &graph.node_order {
        match graph.next_map.get(id) {
            Some(NextEntry::Unconditional(to)) => edges.push((id.clone(), to.clone(), None)),
            Some(NextEntry::Conditional(router)) => {
                for (label, to) in router.branches() {
                    edges.push((id.clone(), to.to_string(), Some(label.to_string())));
                }
            }
            None => {}
        }
    }
    edges
}

/// Mermaid flowchart of the graph, renderable by any Mermaid viewer.
pub fn generate_mermaid<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut out = String::from("graph TD;\n");
    let _ = writeln!(out, "\t{START}([{START}]):::first");
    for id in &graph.node_order {
        let _ = writeln!(out, "\t{id}({id})");
    }
    let _ = writeln!(out, "\t{END}([{END}]):::last");
    for (from, to, label) in edge_list(graph) {
        match label {
            Some(label) => {
                let _ = writeln!(out, "\t{from} -. &nbsp;{label}&nbsp; .-> {to};");
            }
            None => {
                let _ = writeln!(out, "\t{from} --> {to};");
            }
        }
    }
    out.push_str("\tclassDef default fill:#f2f0ff,line-height:1.2\n");
    out.push_str("\tclassDef first fill-opacity:0\n");
    out.push_str("\tclassDef last fill:#bfb6fc\n");
    out
}

/// Graphviz DOT representation of the graph.
pub fn generate_dot<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{START}\" [label=\"START\", shape=oval, style=filled, fillcolor=lightgreen];"
    );
    let _ = writeln!(
        dot,
        "  \"{END}\" [label=\"END\", shape=oval, style=filled, fillcolor=lightcoral];"
    );
    for id in &graph.node_order {
        let _ = writeln!(dot, "  \"{id}\";");
    }
    dot.push('\n');
    for (from, to, label) in edge_list(graph) {
        match label {
            Some(label) => {
                let _ = writeln!(
                    dot,
                    "  \"{from}\" -> \"{to}\" [label=\"{label}\", style=dashed];"
                );
            }
            None => {
                let _ = writeln!(dot, "  \"{from}\" -> \"{to}\";");
            }
        }
    }
    dot.push_str("}\n");
    dot
}
