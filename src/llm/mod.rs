//! Chat-completion provider abstraction for the AI backend.
//!
//! The analyzer and generator take an `Option<Arc<dyn ChatProvider>>` at
//! construction; `None` means no credential was configured and every call
//! uses the deterministic fallback path. Provider errors never cross the
//! analyzer/generator boundary.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockChat;
pub use openai::OpenAiChat;

/// Errors from the AI backend. Always absorbed into fallback behavior.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A chat message
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A chat response
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,

    /// Tokens used, if the provider reports it.
    pub tokens_used: Option<u32>,

    pub latency_ms: u64,

    pub model: String,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends one chat completion request. No internal retries.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, LlmError>;

    /// Sends a system prompt plus one user message.
    async fn chat_with_system(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<ChatResponse, LlmError> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_message),
        ];
        self.chat(&messages).await
    }

    /// Name of the backing model.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_helpers() {
        let system = ChatMessage::system("You are a helpful assistant");
        assert_eq!(system.role, ChatRole::System);

        let user = ChatMessage::user("Hello");
        assert_eq!(user.role, ChatRole::User);
    }
}
