use std::fmt;
use std::str::FromStr;

use ai_client::{Completion, TokenUsage};
use serde::{Deserialize, Serialize};

use crate::error::PriceCheckError;

// --- Search ---

pub const NO_TITLE: &str = "No title";
pub const NO_LINK: &str = "No link";
pub const NO_SNIPPET: &str = "No snippet";

/// A comparable listing returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    /// Build a result, substituting sentinels for absent or blank fields.
    pub fn from_parts(title: Option<String>, link: Option<String>, snippet: Option<String>) -> Self {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            title: or_default(title, NO_TITLE),
            link: or_default(link, NO_LINK),
            snippet: or_default(snippet, NO_SNIPPET),
        }
    }
}

impl From<serpapi_client::OrganicResult> for SearchResult {
    fn from(r: serpapi_client::OrganicResult) -> Self {
        SearchResult::from_parts(r.title, r.link, r.snippet)
    }
}

// --- LLM ---

/// Model output plus the tokens it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    pub usage: TokenUsage,
}

impl From<Completion> for LlmResponse {
    fn from(c: Completion) -> Self {
        Self {
            content: c.content,
            usage: c.usage,
        }
    }
}

// --- Modes ---

/// Shape of the final price analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Free-text analysis written in Thai.
    #[default]
    Narrative,
    /// JSON object with item name, star rating and a THB price range.
    Structured,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Narrative => write!(f, "narrative"),
            AnalysisMode::Structured => write!(f, "structured"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = PriceCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "narrative" | "text" => Ok(AnalysisMode::Narrative),
            "structured" | "json" => Ok(AnalysisMode::Structured),
            other => Err(PriceCheckError::Config(format!(
                "unknown analysis mode '{other}' (expected narrative or structured)"
            ))),
        }
    }
}

/// How the search query is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifyStrategy {
    /// Ask the model to name the item first.
    #[default]
    Model,
    /// Skip identification and search with a fixed generic phrase.
    Generic,
}

impl fmt::Display for IdentifyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifyStrategy::Model => write!(f, "model"),
            IdentifyStrategy::Generic => write!(f, "generic"),
        }
    }
}

impl FromStr for IdentifyStrategy {
    type Err = PriceCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "model" | "llm" => Ok(IdentifyStrategy::Model),
            "generic" => Ok(IdentifyStrategy::Generic),
            other => Err(PriceCheckError::Config(format!(
                "unknown identify strategy '{other}' (expected model or generic)"
            ))),
        }
    }
}

/// What the orchestrator does when the search collaborator fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFailurePolicy {
    #[default]
    Propagate,
    /// Log and continue the analysis with no search results.
    Empty,
}
