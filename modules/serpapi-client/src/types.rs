use serde::{Deserialize, Serialize};

/// Query parameters for `GET /search`. `api_key` is appended by the client.
#[derive(Debug, Clone, Serialize)]
pub struct SearchParams {
    pub engine: String,
    pub q: String,
}

impl SearchParams {
    pub fn google(query: impl Into<String>) -> Self {
        Self {
            engine: "google".to_string(),
            q: query.into(),
        }
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }
}

/// Subset of the SerpAPI search response this client reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    /// Present when SerpAPI accepted the request but could not run it.
    #[serde(default)]
    pub error: Option<String>,
}

/// A single organic result. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_serialize_engine_and_query() {
        let params = SearchParams::google("Cat Figurine ราคา มือสอง");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["engine"], "google");
        assert_eq!(json["q"], "Cat Figurine ราคา มือสอง");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn response_without_organic_results_is_empty() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"search_metadata":{"status":"Success"}}"#).unwrap();
        assert!(resp.organic_results.is_empty());
        assert!(resp.error.is_none());
    }

    #[test]
    fn organic_result_fields_are_optional() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"organic_results":[{"position":1,"title":"Chair"},{"link":"https://x"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.organic_results.len(), 2);
        assert_eq!(resp.organic_results[0].title.as_deref(), Some("Chair"));
        assert!(resp.organic_results[0].link.is_none());
        assert_eq!(resp.organic_results[1].link.as_deref(), Some("https://x"));
    }
}
