//! Chat messages sent to the text-generation service.
//!
//! Agents either send one user prompt (`LlmClient::generate`) or an explicit
//! system + user sequence (the short-form writer).

/// A single message in a chat request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    /// Instructions placed first in the list.
    System(String),
    /// Prompt text.
    User(String),
    /// Earlier model reply.
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Role name as used by OpenAI-compatible APIs.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) | Message::Assistant(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: constructors produce the right role and keep content.
    #[test]
    fn constructors_set_role_and_content() {
        let sys = Message::system("s");
        assert_eq!(sys.role(), "system");
        assert_eq!(sys.content(), "s");
        assert_eq!(Message::user("u").role(), "user");
        assert_eq!(Message::assistant("a").role(), "assistant");
    }
}
