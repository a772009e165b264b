use std::sync::Arc;
use std::time::Duration;

use ai_client::TokenUsage;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{Analysis, AnalysisResult};
use crate::config::Config;
use crate::error::Result;
use crate::image::ImageReference;
use crate::prompts;
use crate::search::{SerpApiSearcher, WebSearcher};
use crate::types::{AnalysisMode, IdentifyStrategy, SearchFailurePolicy, SearchResult};
use crate::vision::{ArkVision, VisionModel};

// --- Reports ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReport {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified_item: Option<String>,
    pub search_query: String,
    pub search_results: Vec<SearchResult>,
    pub analysis: Analysis,
    pub token_usage: UsageReport,
}

/// Tokens per LLM call plus their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageReport {
    /// `None` when identification was skipped.
    pub keyword: Option<TokenUsage>,
    pub analysis: TokenUsage,
    pub total: TokenUsage,
}

impl UsageReport {
    fn new(keyword: Option<TokenUsage>, analysis: TokenUsage) -> Self {
        Self {
            keyword,
            analysis,
            total: keyword.unwrap_or_default() + analysis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyReport {
    pub image_url: String,
    pub identified_item: String,
    pub token_usage: TokenUsage,
}

/// Pipeline progress, reported to an optional observer.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage<'a> {
    Identifying,
    Identified { item: &'a str, usage: TokenUsage },
    Searching { query: &'a str },
    Searched { results: &'a [SearchResult] },
    Analyzing,
}

// --- Options ---

#[derive(Debug, Clone, PartialEq)]
pub struct CheckerOptions {
    pub analysis_mode: AnalysisMode,
    pub identify_strategy: IdentifyStrategy,
    pub search_failure: SearchFailurePolicy,
    pub max_search_results: usize,
    pub verify_image: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            analysis_mode: AnalysisMode::default(),
            identify_strategy: IdentifyStrategy::default(),
            search_failure: SearchFailurePolicy::default(),
            max_search_results: 10,
            verify_image: false,
        }
    }
}

impl CheckerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            analysis_mode: config.analysis_mode,
            identify_strategy: config.identify_strategy,
            search_failure: SearchFailurePolicy::default(),
            max_search_results: config.max_search_results,
            verify_image: config.verify_image,
        }
    }
}

// --- PriceChecker ---

/// Runs identify → search → analyze for one image.
pub struct PriceChecker {
    vision: Arc<dyn VisionModel>,
    searcher: Arc<dyn WebSearcher>,
    http: reqwest::Client,
    options: CheckerOptions,
}

impl PriceChecker {
    pub fn new(
        vision: Arc<dyn VisionModel>,
        searcher: Arc<dyn WebSearcher>,
        options: CheckerOptions,
    ) -> Self {
        Self {
            vision,
            searcher,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            options,
        }
    }

    /// Wire the Ark and SerpAPI collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Arc::new(ArkVision::from_config(config)),
            Arc::new(SerpApiSearcher::from_config(config)?),
            CheckerOptions::from_config(config),
        ))
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn with_options(mut self, options: CheckerOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate a raw URL and, if enabled, probe it.
    pub async fn validate(&self, raw: Option<&str>) -> Result<ImageReference> {
        let image = ImageReference::parse_optional(raw)?;
        if self.options.verify_image {
            image.verify_reachable(&self.http).await?;
        }
        Ok(image)
    }

    /// Run the full pipeline.
    pub async fn check(&self, raw_url: Option<&str>) -> Result<PriceReport> {
        self.check_with_progress(raw_url, |_| {}).await
    }

    pub async fn check_with_progress<F>(
        &self,
        raw_url: Option<&str>,
        mut on_stage: F,
    ) -> Result<PriceReport>
    where
        F: FnMut(Stage<'_>) + Send,
    {
        let image = self.validate(raw_url).await?;
        info!(image = %image, mode = %self.options.analysis_mode, "Price check started");

        let (identified_item, keyword_usage) = match self.options.identify_strategy {
            IdentifyStrategy::Model => {
                on_stage(Stage::Identifying);
                let response = self.vision.identify(&image).await?;
                let item = response.content.trim().to_string();
                on_stage(Stage::Identified {
                    item: &item,
                    usage: response.usage,
                });
                info!(item = %item, "Item identified");
                (Some(item), Some(response.usage))
            }
            IdentifyStrategy::Generic => (None, None),
        };

        let label = identified_item
            .as_deref()
            .filter(|item| !item.is_empty())
            .unwrap_or(prompts::GENERIC_ITEM_PHRASE);
        let search_query = prompts::search_query(label);

        on_stage(Stage::Searching {
            query: &search_query,
        });
        let search_results = self.search(&search_query).await?;
        on_stage(Stage::Searched {
            results: &search_results,
        });

        on_stage(Stage::Analyzing);
        let response = self
            .vision
            .analyze(&image, &search_results, self.options.analysis_mode)
            .await?;
        let analysis = match self.options.analysis_mode {
            AnalysisMode::Narrative => Analysis::Narrative(response.content),
            AnalysisMode::Structured => Analysis::Structured(AnalysisResult::parse(&response.content)),
        };

        let token_usage = UsageReport::new(keyword_usage, response.usage);
        info!(
            image = %image,
            results = search_results.len(),
            total_tokens = token_usage.total.total_tokens,
            "Price check complete"
        );

        Ok(PriceReport {
            image_url: image.as_str().to_string(),
            identified_item,
            search_query,
            search_results,
            analysis,
            token_usage,
        })
    }

    /// Identify the item only. Always uses the model, whatever the strategy.
    pub async fn identify_only(&self, raw_url: Option<&str>) -> Result<IdentifyReport> {
        let image = self.validate(raw_url).await?;
        let response = self.vision.identify(&image).await?;
        let identified_item = response.content.trim().to_string();
        info!(image = %image, item = %identified_item, "Item identified");

        Ok(IdentifyReport {
            image_url: image.as_str().to_string(),
            identified_item,
            token_usage: response.usage,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        match self
            .searcher
            .search(query, self.options.max_search_results)
            .await
        {
            Ok(results) => Ok(results),
            Err(e) => match self.options.search_failure {
                SearchFailurePolicy::Propagate => Err(e),
                SearchFailurePolicy::Empty => {
                    warn!(query, error = %e, "Search failed, continuing without results");
                    Ok(Vec::new())
                }
            },
        }
    }
}

impl std::fmt::Debug for PriceChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceChecker")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
