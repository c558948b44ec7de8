//! Completion provider boundary.
//!
//! The pipeline only ever needs "role-tagged messages in, one generated text
//! out", so the trait is deliberately narrow. HTTP implementations live in
//! `quarry-interaction`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::StageSampling;
use crate::error::Result;

/// Author role of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// One completion call: messages plus sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature, clamped to `[0, 1]` by [`CompletionRequest::with_temperature`].
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Creates a request with the provider's neutral defaults (temperature 0.7, no cap).
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Shorthand for the common system + user pair.
    pub fn from_prompts(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Applies a stage's configured sampling parameters.
    pub fn with_sampling(self, sampling: &StageSampling) -> Self {
        self.with_temperature(sampling.temperature)
            .with_max_tokens(sampling.max_tokens)
    }

    /// Returns the content of the last user message, if any.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Black-box text completion endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the generated text for `request`.
    ///
    /// Fails with [`crate::QuarryError::CompletionUnavailable`] on any provider
    /// error. Implementations do not retry.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier used for requests, for logging.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_is_clamped() {
        let request = CompletionRequest::from_prompts("sys", "user").with_temperature(1.7);
        assert_eq!(request.temperature, 1.0);
        let request = request.with_temperature(-0.2);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_last_user_content() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("s"),
            ChatMessage::user("first"),
            ChatMessage::assistant("a"),
            ChatMessage::user("second"),
        ]);
        assert_eq!(request.last_user_content(), Some("second"));
    }
}
