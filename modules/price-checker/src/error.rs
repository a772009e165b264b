use thiserror::Error;

pub type Result<T> = std::result::Result<T, PriceCheckError>;

#[derive(Error, Debug)]
pub enum PriceCheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("LLM request failed: {0}")]
    Llm(String),
}

/// Reasons an image reference is rejected before any model call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("image URL is required")]
    Missing,

    #[error("invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("image URL is not reachable: {0}")]
    Unreachable(String),

    #[error("URL does not point to an image (content-type: {0})")]
    NotAnImage(String),
}

impl From<serpapi_client::SerpApiError> for PriceCheckError {
    fn from(err: serpapi_client::SerpApiError) -> Self {
        PriceCheckError::Search(err.to_string())
    }
}
