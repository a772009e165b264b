use std::sync::Arc;

use ai_client::{with_backoff, ChatModel, ChatOptions, Message, ModelChain, OpenAi, RetryPolicy};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{PriceCheckError, Result};
use crate::image::ImageReference;
use crate::prompts;
use crate::types::{AnalysisMode, LlmResponse, SearchResult};

// --- VisionModel trait ---

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Name the item, series and year shown in the image.
    async fn identify(&self, image: &ImageReference) -> Result<LlmResponse>;

    /// Estimate a resale price using the image and comparable listings.
    async fn analyze(
        &self,
        image: &ImageReference,
        results: &[SearchResult],
        mode: AnalysisMode,
    ) -> Result<LlmResponse>;
}

// --- Ark (OpenAI-compatible) ---

/// Vision collaborator backed by a [`ChatModel`], with retry and model fallback.
pub struct ArkVision {
    chat: Arc<dyn ChatModel>,
    models: ModelChain,
    retry: RetryPolicy,
}

impl ArkVision {
    pub fn new(chat: Arc<dyn ChatModel>, models: ModelChain, retry: RetryPolicy) -> Self {
        Self {
            chat,
            models,
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let chat = OpenAi::new(&config.ark_api_key)
            .with_base_url(&config.ark_base_url)
            .with_timeout(config.llm_timeout);

        let mut models = ModelChain::new(&config.ark_model);
        if let Some(ref fallback) = config.ark_fallback_model {
            models = models.with_fallback(fallback);
        }

        let retry = RetryPolicy {
            max_retries: config.llm_max_retries,
            ..RetryPolicy::default()
        };

        Self::new(Arc::new(chat), models, retry)
    }

    /// Send one user message (image + instruction) through the retry policy.
    pub async fn complete(
        &self,
        image: &ImageReference,
        instruction: &str,
        options: &ChatOptions,
    ) -> Result<LlmResponse> {
        let messages = [Message::user_with_image(image.as_str(), instruction)];
        let max_attempts = self.retry.max_attempts();

        let retried = with_backoff(&self.retry, |attempt| {
            let model = self.models.model_for_attempt(attempt);
            let chat = &self.chat;
            let messages = &messages;
            async move {
                if attempt > 1 && model != self.models.primary() {
                    warn!(attempt, max_attempts, model, "Retrying with fallback model");
                }
                chat.chat(model, messages, options).await
            }
        })
        .await
        .map_err(|e| PriceCheckError::Llm(e.to_string()))?;

        info!(
            model = %retried.value.model,
            attempts = retried.attempts,
            total_tokens = retried.value.usage.total_tokens,
            "Vision completion succeeded"
        );

        Ok(retried.value.into())
    }
}

fn options_for(mode: AnalysisMode) -> ChatOptions {
    match mode {
        AnalysisMode::Narrative => ChatOptions::default(),
        AnalysisMode::Structured => ChatOptions::default().max_tokens(512).temperature(0.2),
    }
}

#[async_trait]
impl VisionModel for ArkVision {
    async fn identify(&self, image: &ImageReference) -> Result<LlmResponse> {
        self.complete(image, prompts::IDENTIFY_INSTRUCTION, &ChatOptions::default())
            .await
    }

    async fn analyze(
        &self,
        image: &ImageReference,
        results: &[SearchResult],
        mode: AnalysisMode,
    ) -> Result<LlmResponse> {
        let instruction = match mode {
            AnalysisMode::Narrative => prompts::narrative_instruction(results),
            AnalysisMode::Structured => prompts::structured_instruction(results),
        };
        self.complete(image, &instruction, &options_for(mode)).await
    }
}
