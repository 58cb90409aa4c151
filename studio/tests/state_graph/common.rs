//! Shared types for StateGraph integration tests: CounterState and a few agents.

use async_trait::async_trait;
use studio::{Agent, AgentError, LlmError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterState {
    pub value: i64,
    pub trail: Vec<String>,
    pub note: Option<String>,
}

/// Adds `by` to the value and records its name in the trail.
pub struct AddAgent {
    name: &'static str,
    by: i64,
}

impl AddAgent {
    pub fn new(name: &'static str, by: i64) -> Self {
        Self { name, by }
    }
}

#[async_trait]
impl Agent for AddAgent {
    fn name(&self) -> &str {
        self.name
    }
    type State = CounterState;
    fn writes(&self) -> &[&'static str] {
        &["value"]
    }
    async fn run(&self, mut state: Self::State) -> Result<Self::State, AgentError> {
        state.value += self.by;
        state.trail.push(self.name.to_string());
        Ok(state)
    }
}

/// Agent that always returns Err. Used to test error propagation.
pub struct FailingAgent;

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &str {
        "failing"
    }
    type State = CounterState;
    async fn run(&self, _state: Self::State) -> Result<Self::State, AgentError> {
        Err(AgentError::Llm(LlmError::EmptyResponse))
    }
}

/// Agent that requires `note`.
pub struct NeedsNote;

#[async_trait]
impl Agent for NeedsNote {
    fn name(&self) -> &str {
        "needs_note"
    }
    type State = CounterState;
    fn reads(&self) -> &[&'static str] {
        &["note"]
    }
    async fn run(&self, state: Self::State) -> Result<Self::State, AgentError> {
        Ok(state)
    }
}

/// Presence check for CounterState fields.
pub fn counter_has_field(state: &CounterState, field: &str) -> bool {
    match field {
        "value" => true,
        "trail" => !state.trail.is_empty(),
        "note" => state.note.is_some(),
        _ => false,
    }
}
