//! Hook generation: four opening-line options for the long-form writer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::agents::render_style;
use crate::error::AgentError;
use crate::extract::{extract_structured, Extracted};
use crate::llm::LlmClient;
use crate::pipeline::nodes;
use crate::state::{fields, require, ScriptState};
use crate::traits::Agent;

const TEMPERATURE: f32 = 1.0;

/// Keys the model is asked to return.
const HOOK_KEYS: [&str; 4] = ["curiosity_hook", "emotional_hook", "story_hook", "data_hook"];

fn prompt(topic: &str, style: &str) -> String {
    let keys = HOOK_KEYS
        .iter()
        .map(|key| format!("  \"{}\": \"...\"", key))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        r#"You are an expert at writing YouTube hooks.

Write 4 strong opening hooks for a script on:
"{topic}"

Match this creator's tone:
{style}

Return JSON only:
{{
{keys}
}}"#
    )
}

/// Writes `hooks`: the parsed JSON object, or `{"raw_output": reply}` when the reply
/// is not JSON.
pub struct HookAgent {
    llm: Arc<dyn LlmClient>,
}

impl HookAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

/// Requested hook keys absent from `hooks`.
fn missing_hook_keys(hooks: &Value) -> Vec<&'static str> {
    HOOK_KEYS
        .iter()
        .copied()
        .filter(|key| hooks.get(*key).is_none())
        .collect()
}

fn hooks_from_reply(reply: String) -> Value {
    match extract_structured(&reply) {
        Extracted::Structured(v) => {
            let missing = missing_hook_keys(&v);
            if !missing.is_empty() {
                tracing::warn!(missing = ?missing, "hook reply lacks some hook options");
            }
            v
        }
        Extracted::Fallback(raw) => {
            tracing::warn!("hook reply was not JSON, keeping raw text");
            json!({ "raw_output": raw })
        }
    }
}

#[async_trait]
impl Agent for HookAgent {
    type State = ScriptState;

    fn name(&self) -> &str {
        nodes::GENERATE_HOOKS
    }

    fn reads(&self) -> &[&'static str] {
        &[fields::TOPIC, fields::STYLE_PROFILE]
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::HOOKS]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let topic = require(state.topic.as_deref(), fields::TOPIC)?;
        let style = require(state.style_profile.as_ref(), fields::STYLE_PROFILE)?;
        let reply = self
            .llm
            .generate(&prompt(topic, &render_style(style)), TEMPERATURE)
            .await?;
        state.hooks = Some(hooks_from_reply(reply));
        Ok(state)
    }
}
