//! Agent-as-Node blanket impl (traits.rs): id, contract, and error propagation.

use studio::{Agent, AgentError, LlmError, Node};

use crate::common::{AddAgent, CounterState, FailingAgent, NeedsNote};

/// **Scenario**: When an Agent is used as Node<S>, id() equals name().
#[tokio::test]
async fn agent_as_node_id_is_name() {
    let agent = AddAgent::new("inc", 1);
    assert_eq!(Node::id(&agent), agent.name());
    assert_eq!(Node::id(&agent), "inc");
}

/// **Scenario**: declared reads and writes pass through the blanket impl.
#[test]
fn agent_as_node_exposes_field_contract() {
    assert_eq!(Node::<CounterState>::reads(&NeedsNote), &["note"]);
    assert_eq!(Node::<CounterState>::writes(&AddAgent::new("a", 1)), &["value"]);
}

#[tokio::test]
async fn agent_as_node_run_returns_agent_state() {
    let out = Node::run(&AddAgent::new("inc", 5), CounterState::default())
        .await
        .unwrap();
    assert_eq!(out.value, 5);
    assert_eq!(out.trail, vec!["inc".to_string()]);
}

/// **Scenario**: When Agent::run returns Err, Node::run propagates the same error.
#[tokio::test]
async fn agent_as_node_run_propagates_error() {
    let err = Node::run(&FailingAgent, CounterState::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::EmptyResponse)));
}
