//! StateGraph invoke: chains, loops with branch updates, failures, step budget.

use std::sync::Arc;

use studio::{RetryPolicy, RunConfig, RunError, StateGraph, END, START};

use crate::common::{counter_has_field, AddAgent, CounterState, FailingAgent, NeedsNote};

#[tokio::test]
async fn invoke_linear_chain_runs_in_order() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("one", Arc::new(AddAgent::new("one", 1)))
        .unwrap()
        .add_node("ten", Arc::new(AddAgent::new("ten", 10)))
        .unwrap()
        .add_edge(START, "one")
        .unwrap()
        .add_edge("one", "ten")
        .unwrap()
        .add_edge("ten", END)
        .unwrap();

    let compiled = graph.compile().unwrap();
    let state = compiled.invoke(CounterState::default(), None).await.unwrap();
    assert_eq!(state.value, 11);
    assert_eq!(state.trail, vec!["one", "ten"]);
}

fn looping_graph(step_limit: usize) -> StateGraph<CounterState> {
    let mut graph = StateGraph::<CounterState>::new().with_step_limit(step_limit);
    graph
        .add_node("inc", Arc::new(AddAgent::new("inc", 1)))
        .unwrap()
        .set_entry_point("inc")
        .unwrap()
        .add_conditional_edges(
            "inc",
            Arc::new(|s: &CounterState| {
                let label = if s.value < 3 { "again" } else { "done" };
                label.to_string()
            }),
            [
                ("again".to_string(), "inc".to_string()),
                ("done".to_string(), END.to_string()),
            ]
            .into(),
        )
        .unwrap();
    graph
}

/// **Scenario**: a conditional self-loop runs until the router says done; the branch
/// update runs once per time its label is taken, after the router decided.
#[tokio::test]
async fn conditional_loop_applies_branch_update_per_take() {
    let mut graph = looping_graph(50);
    graph
        .add_branch_update(
            "inc",
            "again",
            Arc::new(|s: &mut CounterState| s.trail.push("again".into())),
        )
        .unwrap();
    let state = graph
        .compile()
        .unwrap()
        .invoke(CounterState::default(), None)
        .await
        .unwrap();
    assert_eq!(state.value, 3);
    assert_eq!(state.trail, vec!["inc", "again", "inc", "again", "inc"]);
}

/// **Scenario**: an unbounded cycle is stopped by the step budget.
#[tokio::test]
async fn step_limit_stops_runaway_cycle() {
    let mut graph = StateGraph::<CounterState>::new().with_step_limit(4);
    graph
        .add_node("inc", Arc::new(AddAgent::new("inc", 1)))
        .unwrap()
        .set_entry_point("inc")
        .unwrap()
        .add_edge("inc", "inc")
        .unwrap();
    let err = graph
        .compile()
        .unwrap()
        .invoke(CounterState::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::StepLimitExceeded { limit: 4, ref node_id } if node_id == "inc"
    ));
}

#[tokio::test]
async fn run_config_step_limit_overrides_graph_default() {
    let compiled = looping_graph(50).compile().unwrap();
    let err = compiled
        .invoke(CounterState::default(), Some(RunConfig::new().with_step_limit(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::StepLimitExceeded { limit: 2, .. }));
    assert_eq!(compiled.step_limit(), 50);
}

/// **Scenario**: a router label missing from the path map fails the run.
#[tokio::test]
async fn unknown_label_fails_run() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("inc", Arc::new(AddAgent::new("inc", 1)))
        .unwrap()
        .set_entry_point("inc")
        .unwrap()
        .add_conditional_edges(
            "inc",
            Arc::new(|_: &CounterState| "sideways".to_string()),
            [("done".to_string(), END.to_string())].into(),
        )
        .unwrap();
    let err = graph
        .compile()
        .unwrap()
        .invoke(CounterState::default(), None)
        .await
        .unwrap_err();
    match err {
        RunError::UnknownLabel { node_id, label } => {
            assert_eq!(node_id, "inc");
            assert_eq!(label, "sideways");
        }
        other => panic!("expected UnknownLabel, got {:?}", other),
    }
}

#[tokio::test]
async fn node_error_names_graph_node_id() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("boom", Arc::new(FailingAgent))
        .unwrap()
        .set_entry_point("boom")
        .unwrap()
        .add_edge("boom", END)
        .unwrap();
    let err = graph
        .compile()
        .unwrap()
        .invoke(CounterState::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.node_id(), Some("boom"));
    assert!(err.to_string().contains("'boom'"), "{}", err);
}

/// **Scenario**: non-transient errors are not retried even with a retry policy.
#[tokio::test]
async fn retry_policy_skips_permanent_errors() {
    let mut graph = StateGraph::<CounterState>::new()
        .with_retry_policy(RetryPolicy::fixed(3, std::time::Duration::from_millis(1)));
    graph
        .add_node("boom", Arc::new(FailingAgent))
        .unwrap()
        .set_entry_point("boom")
        .unwrap()
        .add_edge("boom", END)
        .unwrap();
    let started = std::time::Instant::now();
    let err = graph
        .compile()
        .unwrap()
        .invoke(CounterState::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Node { .. }));
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
}

/// **Scenario**: without a field check, declared reads are not enforced.
#[tokio::test]
async fn reads_checked_only_with_field_check() {
    let build = |checked: bool| {
        let graph = StateGraph::<CounterState>::new();
        let mut graph = if checked {
            graph.with_field_check(Arc::new(counter_has_field))
        } else {
            graph
        };
        graph
            .add_node("needs_note", Arc::new(NeedsNote))
            .unwrap()
            .set_entry_point("needs_note")
            .unwrap()
            .add_edge("needs_note", END)
            .unwrap();
        graph.compile().unwrap()
    };
    assert!(build(false).invoke(CounterState::default(), None).await.is_ok());
    let err = build(true)
        .invoke(CounterState::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.node_id(), Some("needs_note"));
    assert!(err.to_string().contains("note"));
}
