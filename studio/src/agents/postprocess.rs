//! Post-processor: strips stage directions and assistant preambles, keeps spoken lines.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::pipeline::nodes;
use crate::state::{fields, require, ScriptState};
use crate::traits::Agent;

const TEMPERATURE: f32 = 0.0;

fn prompt(script: &str) -> String {
    format!(
        r#"Clean the following script. Remove every stage direction or shot description such as
[Opening shot:], [Cut to:] or [Closing shot:]. Keep only the spoken lines.
Do not add any preamble like "Sure! Here's a polished version of your script".
Return the cleaned script text only.

Script:
{script}"#
    )
}

/// Writes `processed_script` (trimmed) from `edited_script`.
pub struct PostProcessAgent {
    llm: Arc<dyn LlmClient>,
}

impl PostProcessAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for PostProcessAgent {
    type State = ScriptState;

    fn name(&self) -> &str {
        nodes::POST_PROCESS
    }

    fn reads(&self) -> &[&'static str] {
        &[fields::EDITED_SCRIPT]
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::PROCESSED_SCRIPT]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let edited = require(state.edited_script.as_deref(), fields::EDITED_SCRIPT)?;
        let cleaned = self.llm.generate(&prompt(edited), TEMPERATURE).await?;
        state.processed_script = Some(cleaned.trim().to_string());
        Ok(state)
    }
}
