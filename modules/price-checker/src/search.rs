use std::time::Duration;

use async_trait::async_trait;
use serpapi_client::{SearchParams, SerpApiClient};
use tracing::info;

use crate::config::Config;
use crate::error::{PriceCheckError, Result};
use crate::types::SearchResult;

// --- WebSearcher trait ---

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Results in provider relevance order, at most `max_results` long.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

// --- SerpAPI (Google Search) ---

pub struct SerpApiSearcher {
    client: Option<SerpApiClient>,
    engine: String,
}

impl SerpApiSearcher {
    /// `api_key = None` builds a searcher that fails every call with a
    /// configuration error.
    pub fn new(api_key: Option<&str>, base_url: &str, engine: &str) -> Result<Self> {
        let client = api_key
            .map(|key| {
                SerpApiClient::with_timeout(key.to_string(), Duration::from_secs(30))
                    .map(|c| c.with_base_url(base_url))
            })
            .transpose()
            .map_err(|e| PriceCheckError::Config(format!("failed to build search client: {e}")))?;

        Ok(Self {
            client,
            engine: engine.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.serpapi_api_key.as_deref(),
            &config.serpapi_base_url,
            &config.search_engine,
        )
    }
}

#[async_trait]
impl WebSearcher for SerpApiSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let client = self.client.as_ref().ok_or_else(|| {
            PriceCheckError::Config("SERPAPI_API_KEY not configured".to_string())
        })?;

        info!(query, max_results, engine = %self.engine, "SerpAPI search");

        let params = SearchParams::google(query).engine(&self.engine);
        let results: Vec<SearchResult> = client
            .search(&params)
            .await?
            .into_iter()
            .take(max_results)
            .map(SearchResult::from)
            .collect();

        info!(query, count = results.len(), "SerpAPI search mapped");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn results_are_truncated_in_provider_order() {
        let organic: Vec<_> = (1..=5)
            .map(|i| json!({"title": format!("Listing {i}"), "link": format!("https://shop.example/{i}")}))
            .collect();
        let router = Router::new().route(
            "/search",
            get(move || {
                let body = json!({ "organic_results": organic.clone() });
                async move { Json(body) }
            }),
        );
        let base = serve(router).await;
        let searcher = SerpApiSearcher::new(Some("key"), &base, "google").unwrap();

        let results = searcher.search("Chair ราคา มือสอง", 3).await.unwrap();

        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Listing 1", "Listing 2", "Listing 3"]);
        assert_eq!(results[0].snippet, "No snippet");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        // The base URL is unroutable; reaching it would surface as a Search
        // error rather than Config.
        let searcher = SerpApiSearcher::new(None, "http://127.0.0.1:1", "google").unwrap();
        let err = searcher.search("anything", 10).await.unwrap_err();
        assert!(matches!(err, PriceCheckError::Config(msg) if msg.contains("SERPAPI_API_KEY")));
    }

    #[tokio::test]
    async fn transport_failure_is_search_error() {
        let searcher =
            SerpApiSearcher::new(Some("key"), "http://127.0.0.1:1", "google").unwrap();
        let err = searcher.search("anything", 10).await.unwrap_err();
        assert!(matches!(err, PriceCheckError::Search(_)));
    }
}
