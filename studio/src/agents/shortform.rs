//! Short-form (Instagram) writer: hook-first, fast, one insight. Sends a system +
//! user message pair.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{render_style, target_words, DEFAULT_SHORTFORM_SECONDS};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::pipeline::nodes;
use crate::state::{fields, require, ScriptState};
use crate::traits::Agent;

const TEMPERATURE: f32 = 1.0;

const SYSTEM_PROMPT: &str = r#"You are an elite short-form scriptwriter trained in high-retention psychology.

Rules for short-form content:
- The first line is a micro-hook (curiosity, emotion or surprise).
- Open loops: hint at something coming later.
- A pattern interrupt every 2 to 4 lines.
- Extremely punchy pacing, no filler.
- Emotional micro-hooks: tension, shock, the aha moment.
- One powerful insight, not many.
- End on a punchline or a cliffhanger, not a call to action."#;

fn user_prompt(topic: &str, style: &str, duration: u32) -> String {
    let words = target_words(duration);
    format!(
        r#"Write a {duration}-second short-form script on "{topic}" using about {words} words.

Use this influencer's tone and phrasing:
{style}

Structure:
1. Micro-hook (one sentence)
2. Open loop
3. Fast-paced insight or story
4. Pattern interrupt (new angle or twist)
5. Emotional payoff or punchline

Rules:
- No greetings.
- Tight, rhythmic sentences.
- Leave mild tension: do not close every loop.
- Refer to the influencer as "Influencer"."#
    )
}

/// Writes `draft_script` for short-form content.
pub struct ShortFormAgent {
    llm: Arc<dyn LlmClient>,
}

impl ShortFormAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for ShortFormAgent {
    type State = ScriptState;

    fn name(&self) -> &str {
        nodes::SHORTFORM_SCRIPT
    }

    fn reads(&self) -> &[&'static str] {
        &[fields::TOPIC, fields::STYLE_PROFILE]
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::DRAFT_SCRIPT]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let topic = require(state.topic.as_deref(), fields::TOPIC)?;
        let style = require(state.style_profile.as_ref(), fields::STYLE_PROFILE)?;
        let duration = state.duration.unwrap_or(DEFAULT_SHORTFORM_SECONDS);
        tracing::info!(duration = duration, "writing short-form script");
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(user_prompt(topic, &render_style(style), duration)),
        ];
        let reply = self.llm.invoke(&messages, TEMPERATURE).await?;
        state.draft_script = Some(reply.content);
        Ok(state)
    }
}
