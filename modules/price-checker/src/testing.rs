// Test doubles for the two collaborator seams.
//
// - ScriptedVision (VisionModel): fixed identify/analyze replies, records calls
// - FixtureSearcher (WebSearcher): static canned results
// - FailingSearcher (WebSearcher): every call is a provider failure

use std::sync::{Arc, Mutex};

use ai_client::TokenUsage;
use async_trait::async_trait;

use crate::error::{PriceCheckError, Result};
use crate::image::ImageReference;
use crate::search::WebSearcher;
use crate::types::{AnalysisMode, LlmResponse, SearchResult};
use crate::vision::VisionModel;

pub fn usage(prompt_tokens: u32, completion_tokens: u32) -> TokenUsage {
    TokenUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
    }
}

pub fn listing(title: &str, link: &str, snippet: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        link: link.to_string(),
        snippet: snippet.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ScriptedVision
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ScriptedVisionInner {
    identify_calls: usize,
    analyzed_with: Vec<(Vec<SearchResult>, AnalysisMode)>,
}

/// Identify replies with `identify` (100 prompt / 10 completion tokens),
/// analyze with `analysis` (200 / 50). Clones share recorded calls.
#[derive(Clone)]
pub struct ScriptedVision {
    identify: std::result::Result<String, String>,
    analysis: String,
    inner: Arc<Mutex<ScriptedVisionInner>>,
}

impl ScriptedVision {
    pub fn new(identify: &str, analysis: &str) -> Self {
        Self {
            identify: Ok(identify.to_string()),
            analysis: analysis.to_string(),
            inner: Arc::new(Mutex::new(ScriptedVisionInner::default())),
        }
    }

    /// Every call fails with an LLM error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            identify: Err(message.to_string()),
            ..Self::new("", "")
        }
    }

    pub fn identify_calls(&self) -> usize {
        self.inner.lock().unwrap().identify_calls
    }

    pub fn analyzed_with(&self) -> Vec<(Vec<SearchResult>, AnalysisMode)> {
        self.inner.lock().unwrap().analyzed_with.clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedVision {
    async fn identify(&self, _image: &ImageReference) -> Result<LlmResponse> {
        self.inner.lock().unwrap().identify_calls += 1;
        match &self.identify {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                usage: usage(100, 10),
            }),
            Err(message) => Err(PriceCheckError::Llm(message.clone())),
        }
    }

    async fn analyze(
        &self,
        _image: &ImageReference,
        results: &[SearchResult],
        mode: AnalysisMode,
    ) -> Result<LlmResponse> {
        self.inner
            .lock()
            .unwrap()
            .analyzed_with
            .push((results.to_vec(), mode));
        if let Err(message) = &self.identify {
            return Err(PriceCheckError::Llm(message.clone()));
        }
        Ok(LlmResponse {
            content: self.analysis.clone(),
            usage: usage(200, 50),
        })
    }
}

// ---------------------------------------------------------------------------
// Searchers
// ---------------------------------------------------------------------------

pub struct FixtureSearcher {
    pub results: Vec<SearchResult>,
}

impl FixtureSearcher {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl WebSearcher for FixtureSearcher {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

pub struct FailingSearcher;

#[async_trait]
impl WebSearcher for FailingSearcher {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
        Err(PriceCheckError::Search("SerpAPI search failed: HTTP 500".to_string()))
    }
}
