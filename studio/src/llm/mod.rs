//! Text-generation client abstraction used by every agent.
//!
//! Agents receive an `Arc<dyn LlmClient>` at construction and make one call per run.
//! `ChatOpenAI` talks to any OpenAI-compatible endpoint; `MockLlm` returns scripted
//! replies for tests.

mod mock;
mod openai;

pub use mock::{MockLlm, RecordedCall};
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::message::Message;

/// Token usage for one LLM call (prompt + completion).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from one completion: assistant text and optional usage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<LlmUsage>,
}

/// Text-generation capability: messages and a temperature in, reply text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion for a message sequence at the given temperature.
    async fn invoke(&self, messages: &[Message], temperature: f32)
        -> Result<LlmResponse, LlmError>;

    /// Single-prompt convenience: sends `prompt` as one user message, returns the text.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let messages = [Message::user(prompt)];
        Ok(self.invoke(&messages, temperature).await?.content)
    }
}
