//! Long-form script writer. Registered twice in the pipeline: once as the first-pass
//! writer (`write_script`) and once as the reviser (`revise_script`).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agents::{render_style, target_words, DEFAULT_LONGFORM_SECONDS};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::pipeline::nodes;
use crate::state::{fields, require, ScriptState};
use crate::traits::Agent;

const DRAFT_TEMPERATURE: f32 = 1.0;
const REVISE_TEMPERATURE: f32 = 0.9;

/// Which job the writer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterMode {
    /// First pass from topic, style, research notes and hooks.
    Draft,
    /// Rewrite of `processed_script` applying `revision_feedback`.
    Revise,
}

/// Writes `draft_script`.
pub struct ScriptWriter {
    llm: Arc<dyn LlmClient>,
    mode: WriterMode,
}

impl ScriptWriter {
    pub fn draft(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            mode: WriterMode::Draft,
        }
    }

    pub fn revise(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            mode: WriterMode::Revise,
        }
    }

    pub fn mode(&self) -> WriterMode {
        self.mode
    }

    async fn write_draft(&self, state: &ScriptState) -> Result<String, AgentError> {
        let topic = require(state.topic.as_deref(), fields::TOPIC)?;
        let style = require(state.style_profile.as_ref(), fields::STYLE_PROFILE)?;
        let duration = state.duration.unwrap_or(DEFAULT_LONGFORM_SECONDS);
        tracing::info!(duration = duration, "writing long-form draft");
        let prompt = draft_prompt(
            topic,
            &render_style(style),
            state.research_notes.as_deref().unwrap_or(""),
            state.hooks.as_ref(),
            duration,
        );
        Ok(self.llm.generate(&prompt, DRAFT_TEMPERATURE).await?)
    }

    async fn write_revision(&self, state: &ScriptState) -> Result<String, AgentError> {
        let script = require(state.processed_script.as_deref(), fields::PROCESSED_SCRIPT)?;
        let feedback = require(state.revision_feedback.as_deref(), fields::REVISION_FEEDBACK)?;
        tracing::info!(revision = state.revisions(), "revising script from feedback");
        let prompt = revise_prompt(script, feedback, state.style_profile.as_ref());
        Ok(self.llm.generate(&prompt, REVISE_TEMPERATURE).await?)
    }
}

fn hooks_section(hooks: Option<&Value>) -> String {
    match hooks {
        Some(Value::Object(map)) if !map.contains_key("raw_output") => {
            let lines: Vec<String> = map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("- {k}: {s}"),
                    other => format!("- {k}: {other}"),
                })
                .collect();
            format!(
                "\n--- Hook Options (open with the strongest, or blend them) ---\n{}\n",
                lines.join("\n")
            )
        }
        Some(Value::Object(map)) => match map.get("raw_output") {
            Some(Value::String(raw)) => format!("\n--- Hook Ideas ---\n{raw}\n"),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

fn draft_prompt(
    topic: &str,
    style: &str,
    research: &str,
    hooks: Option<&Value>,
    duration: u32,
) -> String {
    let words = target_words(duration);
    let hooks = hooks_section(hooks);
    format!(
        r#"You are a professional YouTube scriptwriter who must mirror the influencer's communication style exactly.

Topic: "{topic}"
Target duration: {duration} seconds (about {words} words)

--- Influencer Style Profile (follow strictly) ---
{style}

--- Research Notes (for accuracy) ---
{research}
{hooks}
Style rules:
1. Vocabulary: reuse the word choices and signature expressions from the profile.
2. Rhythm: match the influencer's cadence and sentence-length variation.
3. Pacing: open strong, keep momentum, put punchy lines at natural breaks.
4. Emotional tone: powerful beats for a motivational persona, introspective transitions for a reflective one.
5. Signature phrases: sparing and organic, never forced.
6. Persona: speak as the influencer thinks, not only as they talk.

Structure:
- Hook
- Relatable story or narrative bridge
- Framework or reasoning
- Real-world examples or comparisons
- Emotionally resonant close (no generic call to action)

Refer to the influencer generically as "Influencer". Never break character or slip into a generic assistant tone.

Write the full script now."#
    )
}

fn revise_prompt(script: &str, feedback: &str, style: Option<&Value>) -> String {
    let style = style
        .map(|s| format!("\n--- Influencer Style Profile ---\n{}\n", render_style(s)))
        .unwrap_or_default();
    format!(
        r#"You are revising a YouTube script based on quality feedback.

Script to improve:
{script}

Feedback (must be applied):
{feedback}
{style}
Goals:
- Closer match to the influencer's voice.
- Stronger emotional tone and narrative impact.
- Tighter pacing: remove rambling, improve flow.
- Clearer storytelling.
- Keep the influencer's style, tone and persona.

Return the improved script only."#
    )
}

#[async_trait]
impl Agent for ScriptWriter {
    type State = ScriptState;

    fn name(&self) -> &str {
        match self.mode {
            WriterMode::Draft => nodes::WRITE_SCRIPT,
            WriterMode::Revise => nodes::REVISE_SCRIPT,
        }
    }

    fn reads(&self) -> &[&'static str] {
        match self.mode {
            WriterMode::Draft => &[fields::TOPIC, fields::STYLE_PROFILE],
            WriterMode::Revise => &[fields::PROCESSED_SCRIPT, fields::REVISION_FEEDBACK],
        }
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::DRAFT_SCRIPT]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let draft = match self.mode {
            WriterMode::Draft => self.write_draft(&state).await?,
            WriterMode::Revise => self.write_revision(&state).await?,
        };
        state.draft_script = Some(draft);
        Ok(state)
    }
}
