use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PriceCheckError, Result};
use crate::types::{AnalysisMode, IdentifyStrategy};

pub const DEFAULT_ARK_BASE_URL: &str = "https://ark.ap-southeast.bytepluses.com/api/v3";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";

/// Upper bound for `LLM_MAX_RETRIES`.
pub const MAX_LLM_RETRIES: u32 = 10;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // Vision-language model (Ark, OpenAI-compatible)
    pub ark_api_key: String,
    pub ark_base_url: String,
    pub ark_model: String,
    pub ark_fallback_model: Option<String>,
    pub llm_max_retries: u32,
    pub llm_timeout: Duration,

    // Search
    pub serpapi_api_key: Option<String>,
    pub serpapi_base_url: String,
    pub search_engine: String,
    pub max_search_results: usize,

    // Pipeline
    pub analysis_mode: AnalysisMode,
    pub identify_strategy: IdentifyStrategy,
    pub verify_image: bool,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                PriceCheckError::Config(format!("{key} environment variable is required"))
            })
        };

        Ok(Self {
            ark_api_key: required("ARK_API_KEY")?,
            ark_base_url: get("ARK_BASE_URL").unwrap_or_else(|| DEFAULT_ARK_BASE_URL.to_string()),
            ark_model: required("ARK_MODEL")?,
            ark_fallback_model: get("ARK_FALLBACK_MODEL"),
            llm_max_retries: at_most(
                "LLM_MAX_RETRIES",
                parse_or("LLM_MAX_RETRIES", get("LLM_MAX_RETRIES"), 2)?,
                MAX_LLM_RETRIES,
            )?,
            llm_timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                60,
            )?),
            serpapi_api_key: get("SERPAPI_API_KEY"),
            serpapi_base_url: get("SERPAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERPAPI_BASE_URL.to_string()),
            search_engine: get("SEARCH_ENGINE").unwrap_or_else(|| "google".to_string()),
            max_search_results: parse_or("MAX_SEARCH_RESULTS", get("MAX_SEARCH_RESULTS"), 10)?,
            analysis_mode: parse_or("ANALYSIS_MODE", get("ANALYSIS_MODE"), AnalysisMode::default())?,
            identify_strategy: parse_or(
                "IDENTIFY_STRATEGY",
                get("IDENTIFY_STRATEGY"),
                IdentifyStrategy::default(),
            )?,
            verify_image: parse_bool("VERIFY_IMAGE_URL", get("VERIFY_IMAGE_URL"))?,
            web_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse_or("WEB_PORT", get("WEB_PORT").or_else(|| get("PORT")), 3000)?,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ark_api_key", &"<redacted>")
            .field("ark_base_url", &self.ark_base_url)
            .field("ark_model", &self.ark_model)
            .field("ark_fallback_model", &self.ark_fallback_model)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("llm_timeout", &self.llm_timeout)
            .field(
                "serpapi_api_key",
                &self.serpapi_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("search_engine", &self.search_engine)
            .field("max_search_results", &self.max_search_results)
            .field("analysis_mode", &self.analysis_mode)
            .field("identify_strategy", &self.identify_strategy)
            .field("verify_image", &self.verify_image)
            .field("web_host", &self.web_host)
            .field("web_port", &self.web_port)
            .finish()
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e| PriceCheckError::Config(format!("{key} is invalid ('{v}'): {e}"))),
    }
}

fn at_most(key: &str, value: u32, max: u32) -> Result<u32> {
    if value > max {
        return Err(PriceCheckError::Config(format!(
            "{key} must be at most {max}, got {value}"
        )));
    }
    Ok(value)
}

fn parse_bool(key: &str, value: Option<String>) -> Result<bool> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(PriceCheckError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
