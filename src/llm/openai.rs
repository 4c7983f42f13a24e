//! OpenAI-compatible chat client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, ChatProvider, ChatResponse, ChatRole, LlmError};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI chat-completion client.
pub struct OpenAiChat {
    client: Client,
    api_base: String,
    api_key: String,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChat {
    /// Creates a client with a bounded request timeout.
    pub fn new(api_key: String, model_name: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: OPENAI_API_BASE.to_string(),
            api_key,
            model_name,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    /// Overrides the API base URL (for self-hosted compatible endpoints).
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChatChoice>,
    usage: Option<OpenAiChatUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatChoice {
    message: OpenAiChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatMessageResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);

        let wire_messages: Vec<OpenAiChatMessage> = messages
            .iter()
            .map(|msg| OpenAiChatMessage {
                role: match msg.role {
                    ChatRole::System => "system".to_string(),
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "assistant".to_string(),
                },
                content: msg.content.clone(),
            })
            .collect();

        let request = OpenAiChatRequest {
            model: self.model_name.clone(),
            messages: wire_messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Sending chat request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        let latency_ms = start.elapsed().as_millis() as u64;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| LlmError::Malformed("no choices in response".to_string()))?;

        Ok(ChatResponse {
            content,
            tokens_used: parsed.usage.map(|u| u.total_tokens),
            latency_ms,
            model: self.model_name.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let chat = OpenAiChat::new(
            "test-key".to_string(),
            "gpt-3.5-turbo".to_string(),
            Duration::from_secs(30),
        );
        assert_eq!(chat.model_name(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_api_base_override() {
        let chat = OpenAiChat::new(
            "test-key".to_string(),
            "gpt-4".to_string(),
            Duration::from_secs(30),
        )
        .with_api_base("http://localhost:8080/v1/");
        assert_eq!(chat.api_base, "http://localhost:8080/v1");
    }
}
