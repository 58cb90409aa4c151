//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Works against api.openai.com or any OpenAI-compatible base URL (local servers,
//! proxies). Each call is bounded by a timeout; an expired call becomes a transient
//! `LlmError::Timeout` so the graph's retry policy can re-run the node.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::LlmError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage};
use crate::message::Message;
use crate::settings::LlmSettings;

/// Provider error codes and types that describe a temporary condition.
const TRANSIENT_API_ERRORS: &[&str] = &[
    "rate_limit_exceeded",
    "rate_limit_error",
    "server_error",
    "service_unavailable",
    "overloaded",
    "overloaded_error",
    "engine_overloaded",
    "timeout",
    "requests",
    "tokens",
];

/// Maps a provider error body to `Api` (retryable) or `Rejected` from its code and type.
/// An error carrying neither is treated as rejected.
fn classify_api_error(code: Option<&str>, kind: Option<&str>, message: &str) -> LlmError {
    let described = match (kind, code) {
        (Some(kind), Some(code)) => format!("{}: {} (code: {})", kind, message, code),
        (Some(kind), None) => format!("{}: {}", kind, message),
        (None, Some(code)) => format!("{} (code: {})", message, code),
        (None, None) => message.to_string(),
    };
    let transient = [code, kind]
        .into_iter()
        .flatten()
        .any(|c| TRANSIENT_API_ERRORS.contains(&c));
    if transient {
        LlmError::Api(described)
    } else {
        LlmError::Rejected(described)
    }
}

/// Network failures are retryable; provider errors are classified by code; anything
/// else (undecodable reply, invalid argument) is rejected.
fn map_openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::Reqwest(e) => LlmError::Api(e.to_string()),
        OpenAIError::ApiError(api) => {
            classify_api_error(api.code.as_deref(), api.r#type.as_deref(), &api.message)
        }
        other => LlmError::Rejected(other.to_string()),
    }
}

/// OpenAI Chat Completions client.
///
/// Uses `OPENAI_API_KEY` from the environment by default; `from_settings` applies an
/// explicit key, base URL, model and timeout.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    base_url: Option<String>,
}

impl ChatOpenAI {
    /// Client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            timeout: LlmSettings::default().timeout,
            base_url: None,
        }
    }

    /// Client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            ..Self::new(model)
        }
    }

    /// Client configured from pipeline settings.
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(key) = &settings.api_key {
            config = config.with_api_key(key);
        }
        if let Some(base) = &settings.base_url {
            config = config.with_api_base(base);
        }
        Self {
            base_url: settings.base_url.clone(),
            ..Self::with_config(config, settings.model.clone()).with_timeout(settings.timeout)
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat completions URL, for logs.
    fn chat_completions_url(&self) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1")
            .trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => ChatCompletionRequestMessage::Assistant(s.as_str().into()),
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(Self::messages_to_request(messages))
            .temperature(temperature)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;

        let url = self.chat_completions_url();
        debug!(
            url = %url,
            model = %self.model,
            message_count = messages.len(),
            temperature = temperature,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(url = %url, request = %js, "OpenAI request body");
        }

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
            .map_err(map_openai_error)?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(url = %url, response = %js, "OpenAI response body");
        }

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;
        debug!(
            model = %self.model,
            reply_chars = content.len(),
            total_tokens = usage.map(|u| u.total_tokens),
            "OpenAI chat reply"
        );
        Ok(LlmResponse { content, usage })
    }
}
