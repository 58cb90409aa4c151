//! Research agent: topic → bullet-point research notes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::pipeline::nodes;
use crate::state::{fields, require, ScriptState};
use crate::traits::Agent;

const TEMPERATURE: f32 = 0.9;

fn prompt(topic: &str) -> String {
    format!(
        r#"You are a research assistant for professional YouTube and Instagram creators.
Produce accurate, recent and actionable research notes on:
"{topic}"

Rules:
- Concise but information-dense; bullet points only.
- When a fact or statistic is uncertain, write: "Data unclear / varies by source."
- Prefer the most recent information available.
- No filler, no motivational lines, no generic advice.

Sections:
1. Verified facts
2. Recent statistics, each with its source (write "No reliable stat available." when none exists)
3. Trends and insights: macro trends, early niche developments, platform-specific patterns
4. Common misconceptions, each briefly corrected
5. Angles for scriptwriting: 3 to 5 talking points that make a strong narrative

Keep it factual, recent and in exactly this structure."#
    )
}

/// Writes `research_notes` from `topic`.
pub struct ResearchAgent {
    llm: Arc<dyn LlmClient>,
}

impl ResearchAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    type State = ScriptState;

    fn name(&self) -> &str {
        nodes::RESEARCH
    }

    fn reads(&self) -> &[&'static str] {
        &[fields::TOPIC]
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::RESEARCH_NOTES]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let topic = require(state.topic.as_deref(), fields::TOPIC)?;
        tracing::info!(topic = topic, "researching topic");
        let notes = self.llm.generate(&prompt(topic), TEMPERATURE).await?;
        state.research_notes = Some(notes);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use serde_json::json;

    #[tokio::test]
    async fn writes_notes_from_topic() {
        let llm = Arc::new(MockLlm::new("- fact one"));
        let agent = ResearchAgent::new(llm.clone());
        let out = Agent::run(&agent, ScriptState::new("sleep science", json!({})))
            .await
            .unwrap();
        assert_eq!(out.research_notes.as_deref(), Some("- fact one"));
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, 0.9);
        assert!(calls[0].text().contains("\"sleep science\""));
    }

    /// **Scenario**: missing topic fails without calling the LLM.
    #[tokio::test]
    async fn missing_topic_fails() {
        let llm = Arc::new(MockLlm::new("unused"));
        let agent = ResearchAgent::new(llm.clone());
        let err = Agent::run(&agent, ScriptState::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingField(f) if f == "topic"));
        assert_eq!(llm.call_count(), 0);
    }
}
