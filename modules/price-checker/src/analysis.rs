use ai_client::strip_code_blocks;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Structured price estimate. Parsed from the model's snake_case JSON,
/// serialized for API clients in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename(serialize = "itemName"))]
    pub item_name: String,
    #[serde(rename(serialize = "ratingStars"))]
    pub rating_stars: f64,
    #[serde(rename(serialize = "minPriceTHB"))]
    pub min_price_thb: f64,
    #[serde(rename(serialize = "maxPriceTHB"))]
    pub max_price_thb: f64,
}

impl AnalysisResult {
    /// Substituted whenever the model's JSON cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            item_name: "Unknown Item".to_string(),
            rating_stars: 3.0,
            min_price_thb: 100.0,
            max_price_thb: 500.0,
        }
    }

    /// Parse model content, recovering with [`AnalysisResult::fallback`].
    pub fn parse(content: &str) -> Self {
        match serde_json::from_str::<AnalysisResult>(strip_code_blocks(content)) {
            Ok(parsed) => parsed.normalized(),
            Err(e) => {
                warn!(error = %e, "Structured analysis was not valid JSON, using fallback");
                Self::fallback()
            }
        }
    }

    /// Clamp the rating to [0, 5], floor prices at zero, order the range.
    fn normalized(mut self) -> Self {
        if !self.rating_stars.is_finite() {
            self.rating_stars = Self::fallback().rating_stars;
        }
        self.rating_stars = self.rating_stars.clamp(0.0, 5.0);
        self.min_price_thb = self.min_price_thb.max(0.0);
        self.max_price_thb = self.max_price_thb.max(0.0);
        if self.min_price_thb > self.max_price_thb {
            std::mem::swap(&mut self.min_price_thb, &mut self.max_price_thb);
        }
        self
    }
}

/// Final analysis as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Analysis {
    Narrative(String),
    Structured(AnalysisResult),
}
