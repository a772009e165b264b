mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::{AiError, Result};
use crate::traits::{ChatModel, ChatOptions, Completion, Message, TokenUsage};

use client::OpenAiClient;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// OpenAi
// =============================================================================

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self) -> Result<OpenAiClient> {
        if self.api_key.is_empty() {
            return Err(AiError::Config("API key is empty".to_string()));
        }
        OpenAiClient::new(&self.api_key, &self.base_url, self.timeout)
    }
}

// =============================================================================
// ChatModel Implementation
// =============================================================================

#[async_trait]
impl ChatModel for OpenAi {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<Completion> {
        let request = types::ChatRequest::new(model)
            .messages(messages)
            .max_tokens(options.max_tokens)
            .temperature(options.temperature);

        let response = self.client()?.chat(&request).await?;

        let usage: TokenUsage = response.usage.map(Into::into).unwrap_or_default();
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::EmptyResponse(format!("no content from model {model}")))?;

        info!(
            model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Chat completion usage"
        );

        Ok(Completion {
            content,
            usage,
            model: model.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let ai = OpenAi::new("sk-test");
        assert_eq!(ai.base_url(), "https://api.openai.com/v1");
        assert_eq!(ai.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_openai_with_base_url() {
        let ai = OpenAi::new("sk-test").with_base_url("https://ark.example.com/api/v3");
        assert_eq!(ai.base_url(), "https://ark.example.com/api/v3");
    }

    #[test]
    fn test_debug_redacts_key() {
        let ai = OpenAi::new("sk-secret");
        let debug = format!("{ai:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn completions(reply: serde_json::Value) -> axum::Router {
        axum::Router::new().route(
            "/chat/completions",
            axum::routing::post(move |axum::Json(body): axum::Json<serde_json::Value>| {
                let mut reply = reply.clone();
                reply["model"] = body["model"].clone();
                async move { axum::Json(reply) }
            }),
        )
    }

    #[tokio::test]
    async fn test_chat_reads_content_and_usage() {
        let base = serve(completions(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Cat Figurine, 2020"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        })))
        .await;

        let completion = OpenAi::new("sk-test")
            .with_base_url(base)
            .chat(
                "ep-vision",
                &[Message::user_with_image("https://example.com/cat.jpg", "What is this?")],
                &ChatOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(completion.content, "Cat Figurine, 2020");
        assert_eq!(completion.model, "ep-vision");
        assert_eq!(
            completion.usage,
            TokenUsage {
                prompt_tokens: 120,
                completion_tokens: 8,
                total_tokens: 128,
            }
        );
    }

    #[tokio::test]
    async fn test_chat_without_usage_defaults_to_zero() {
        let base = serve(completions(serde_json::json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .await;

        let completion = OpenAi::new("sk-test")
            .with_base_url(base)
            .chat("m", &[Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.usage, TokenUsage::default());
    }

    #[tokio::test]
    async fn test_chat_without_choices_is_empty_response() {
        let base = serve(completions(serde_json::json!({ "choices": [] }))).await;

        let err = OpenAi::new("sk-test")
            .with_base_url(base)
            .chat("m", &[Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let router = axum::Router::new().route(
            "/chat/completions",
            axum::routing::post(|| async {
                (axum::http::StatusCode::TOO_MANY_REQUESTS, "rate limited")
            }),
        );
        let base = serve(router).await;

        let err = OpenAi::new("sk-test")
            .with_base_url(base)
            .chat("m", &[Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::Api { status: 429, ref message } if message == "rate limited"));
    }

    #[tokio::test]
    async fn test_empty_key_is_config_error() {
        let ai = OpenAi::new("");
        let err = ai
            .chat("m", &[Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Config(_)));
    }
}
