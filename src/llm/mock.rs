//! Mock chat provider for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, ChatProvider, ChatResponse, LlmError};

/// Mock chat provider for testing
///
/// Returns scripted replies in order, then repeats the last one. Can be
/// switched to fail on every call to exercise fallback paths.
pub struct MockChat {
    replies: Mutex<Vec<String>>,
    should_fail: bool,
}

impl MockChat {
    /// Creates a provider that always returns `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(vec![reply.into()]),
            should_fail: false,
        }
    }

    /// Creates a provider returning the given replies in order.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies),
            should_fail: false,
        }
    }

    /// Makes every call fail with a request error.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(vec![]),
            should_fail: true,
        }
    }
}

#[async_trait]
impl ChatProvider for MockChat {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<ChatResponse, LlmError> {
        if self.should_fail {
            return Err(LlmError::Request("mock provider failure".to_string()));
        }

        let mut replies = self.replies.lock().unwrap();
        let content = if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .ok_or_else(|| LlmError::Malformed("mock has no replies".to_string()))?
        };

        Ok(ChatResponse {
            content,
            tokens_used: None,
            latency_ms: 0,
            model: "mock".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockChat::with_replies(vec!["first".to_string(), "second".to_string()]);

        let r1 = mock.chat(&[]).await.unwrap();
        assert_eq!(r1.content, "first");

        let r2 = mock.chat(&[]).await.unwrap();
        assert_eq!(r2.content, "second");

        // Last reply repeats
        let r3 = mock.chat(&[]).await.unwrap();
        assert_eq!(r3.content, "second");
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockChat::failing();
        assert!(mock.chat(&[]).await.is_err());
    }
}
