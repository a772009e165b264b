use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::ValidationError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// An absolute `http://` or `https://` URL to the image being priced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference(String);

impl ImageReference {
    /// Validate a raw URL string. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let url = raw.trim();
        if url.is_empty() {
            return Err(ValidationError::Missing);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }
        let parsed =
            url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ValidationError::InvalidUrl("URL has no host".to_string()));
        }
        Ok(Self(url.to_string()))
    }

    /// Validate an optional field from a request body.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Err(ValidationError::Missing),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Confirm the URL answers a HEAD request with an `image/*` content type.
    pub async fn verify_reachable(&self, http: &reqwest::Client) -> Result<(), ValidationError> {
        let resp = http
            .head(&self.0)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.0, error = %e, "Image probe failed");
                ValidationError::Unreachable(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ValidationError::Unreachable(format!("HTTP {status}")));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        debug!(url = %self.0, content_type = %content_type, "Image probe response");

        if !is_image_content_type(&content_type) {
            return Err(ValidationError::NotAnImage(if content_type.is_empty() {
                "missing".to_string()
            } else {
                content_type
            }));
        }
        Ok(())
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}
