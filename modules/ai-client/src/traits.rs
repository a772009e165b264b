use std::ops::{Add, AddAssign};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

// =============================================================================
// Message Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    ImageUrl(String),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub parts: Vec<ContentPart>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    /// A user message carrying an image followed by a text instruction.
    pub fn user_with_image(image_url: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![
                ContentPart::ImageUrl(image_url.into()),
                ContentPart::Text(instruction.into()),
            ],
        }
    }

    /// Concatenated text parts, ignoring images.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::ImageUrl(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Completion Types
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatOptions {
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: Self) -> Self {
        Self {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            total_tokens: self.total_tokens + rhs.total_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
    /// Model that actually served the request.
    pub model: String,
}

// =============================================================================
// ChatModel Trait
// =============================================================================

/// A chat-completion backend that accepts an explicit model id per call, so
/// callers can walk a fallback chain without rebuilding the client.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_with_image_keeps_part_order() {
        let msg = Message::user_with_image("https://example.com/a.jpg", "describe");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(
            msg.parts,
            vec![
                ContentPart::ImageUrl("https://example.com/a.jpg".to_string()),
                ContentPart::Text("describe".to_string()),
            ]
        );
        assert_eq!(msg.text(), "describe");
    }

    #[test]
    fn token_usage_adds_fieldwise() {
        let mut total = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 2,
            total_tokens: 12,
        };
        total += TokenUsage {
            prompt_tokens: 5,
            completion_tokens: 3,
            total_tokens: 8,
        };
        assert_eq!(total.prompt_tokens, 15);
        assert_eq!(total.completion_tokens, 5);
        assert_eq!(total.total_tokens, 20);
    }

    #[test]
    fn token_usage_serializes_camel_case() {
        let usage = TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        };
        let json = serde_json::to_value(usage).unwrap();
        assert_eq!(json["promptTokens"], 1);
        assert_eq!(json["completionTokens"], 2);
        assert_eq!(json["totalTokens"], 3);
    }
}
