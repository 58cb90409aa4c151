//! Mock LLM for tests and offline runs.
//!
//! Three modes: a fixed reply, a script of replies consumed in order (then the fixed
//! reply), or a responder closure that sees the messages and temperature. Every call is
//! recorded so tests can assert on prompts and temperatures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

type ResponderFn = Arc<dyn Fn(&[Message], f32) -> Result<String, LlmError> + Send + Sync>;

/// One call seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub temperature: f32,
}

impl RecordedCall {
    /// All message contents joined, for substring assertions.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(Message::content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Mock LLM: fixed, scripted, or closure-driven replies.
pub struct MockLlm {
    content: String,
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    responder: Option<ResponderFn>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockLlm {
    /// Always replies with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            script: Mutex::new(VecDeque::new()),
            responder: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies with each scripted entry in turn, then with `content` once exhausted.
    pub fn scripted(
        replies: impl IntoIterator<Item = Result<String, LlmError>>,
        content: impl Into<String>,
    ) -> Self {
        let mock = Self::new(content);
        lock(&mock.script).extend(replies);
        mock
    }

    /// Replies with whatever `f` returns for the request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Message], f32) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Arc::new(f)),
            ..Self::new("")
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        lock(&self.calls).push(RecordedCall {
            messages: messages.to_vec(),
            temperature,
        });
        let scripted = lock(&self.script).pop_front();
        let content = match (scripted, &self.responder) {
            (Some(reply), _) => reply?,
            (None, Some(f)) => f(messages, temperature)?,
            (None, None) => self.content.clone(),
        };
        Ok(LlmResponse {
            content,
            usage: None,
        })
    }
}
