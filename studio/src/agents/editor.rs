//! Style-preserving editor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::render_style;
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::pipeline::nodes;
use crate::state::{fields, require, ScriptState};
use crate::traits::Agent;

const TEMPERATURE: f32 = 0.6;

fn prompt(draft: &str, style: &str) -> String {
    format!(
        r#"You are a professional script editor specialising in style-preserving edits.

Improve clarity, pacing, emotional flow and narrative structure. Do not change the
influencer's tone, persona or signature style.

--- Influencer Style Profile (preserve) ---
{style}

Rules:
1. Keep vocabulary patterns consistent with the influencer.
2. Keep the original sentence rhythm (short versus long patterns).
3. Keep emotional tone markers.
4. Keep signature phrasing: enhance it, never replace it.
5. Refine stylistic quirks instead of removing them.
6. Keep the persona's voice and worldview.
7. Fix grammar and transitions without altering the stylistic identity.

--- Script to Edit ---
{draft}

Return only the polished script."#
    )
}

/// Writes `edited_script` from `draft_script`.
pub struct EditorAgent {
    llm: Arc<dyn LlmClient>,
}

impl EditorAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for EditorAgent {
    type State = ScriptState;

    fn name(&self) -> &str {
        nodes::EDIT_SCRIPT
    }

    fn reads(&self) -> &[&'static str] {
        &[fields::DRAFT_SCRIPT]
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::EDITED_SCRIPT]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let draft = require(state.draft_script.as_deref(), fields::DRAFT_SCRIPT)?;
        let style = state
            .style_profile
            .as_ref()
            .map(render_style)
            .unwrap_or_else(|| "(no style profile provided)".to_string());
        let edited = self.llm.generate(&prompt(draft, &style), TEMPERATURE).await?;
        state.edited_script = Some(edited);
        Ok(state)
    }
}
