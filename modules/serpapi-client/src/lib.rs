pub mod error;
pub mod types;

pub use error::{Result, SerpApiError};
pub use types::{OrganicResult, SearchParams, SearchResponse};

use std::time::Duration;

const BASE_URL: &str = "https://serpapi.com";

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Run a search and return the organic results in provider order.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<OrganicResult>> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!(engine = %params.engine, query = %params.q, "SerpAPI search request");

        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SerpApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let data: SearchResponse = serde_json::from_str(&body)?;
        if let Some(error) = data.error {
            // "Google hasn't returned any results" is reported as an error
            // with a 200 status; treat it as an empty result set.
            if error.contains("hasn't returned any results") {
                tracing::info!(query = %params.q, "SerpAPI returned no results");
                return Ok(Vec::new());
            }
            return Err(SerpApiError::Search(error));
        }

        tracing::info!(
            query = %params.q,
            count = data.organic_results.len(),
            "SerpAPI search complete"
        );
        Ok(data.organic_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> SerpApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        SerpApiClient::new("serp-key".to_string())
            .unwrap()
            .with_base_url(&format!("http://{addr}"))
    }

    fn replying(body: serde_json::Value) -> Router {
        Router::new().route(
            "/search",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        )
    }

    #[tokio::test]
    async fn sends_query_and_key_and_keeps_order() {
        // Echo the query parameters back as result titles.
        let router = Router::new().route(
            "/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "organic_results": [
                        {"title": params["q"], "link": "https://a"},
                        {"title": params["engine"], "link": "https://b"},
                        {"title": params["api_key"]}
                    ]
                }))
            }),
        );
        let client = serve(router).await;

        let results = client
            .search(&SearchParams::google("Cat Figurine ราคา มือสอง"))
            .await
            .unwrap();

        let titles: Vec<_> = results.iter().map(|r| r.title.as_deref().unwrap()).collect();
        assert_eq!(titles, vec!["Cat Figurine ราคา มือสอง", "google", "serp-key"]);
        assert_eq!(results[1].link.as_deref(), Some("https://b"));
        assert!(results[2].link.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let router = Router::new().route(
            "/search",
            get(|| async { (StatusCode::UNAUTHORIZED, "Invalid API key") }),
        );
        let client = serve(router).await;

        let err = client.search(&SearchParams::google("q")).await.unwrap_err();
        assert!(
            matches!(&err, SerpApiError::Api { status: 401, message } if message == "Invalid API key"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn no_results_error_is_empty_list() {
        let client = serve(replying(json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .await;

        let results = client.search(&SearchParams::google("q")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn other_reported_error_is_search_error() {
        let client = serve(replying(json!({
            "error": "Your account has run out of searches."
        })))
        .await;

        let err = client.search(&SearchParams::google("q")).await.unwrap_err();
        assert!(matches!(err, SerpApiError::Search(msg) if msg.contains("run out")));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = SerpApiClient::new("key".to_string())
            .unwrap()
            .with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let client = SerpApiClient::with_timeout("key".to_string(), Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let err = client
            .search(&SearchParams::google("anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, SerpApiError::Network(_)));
    }
}
