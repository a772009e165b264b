//! Instruction texts sent alongside the image.

use crate::types::SearchResult;

pub const IDENTIFY_INSTRUCTION: &str = "Based on this image, identify the main item, its series, and year of production. Only output the item, series, and year, nothing else.";

/// Localized market-price keywords appended to the item label.
pub const MARKET_PRICE_KEYWORDS: &str = "ราคา มือสอง";

/// Label used when identification is skipped.
pub const GENERIC_ITEM_PHRASE: &str = "สินค้า";

const NARRATIVE_OUTPUT_DIRECTIVE: &str = "Output: คุณภาพของอุปกรณ์ และ สรุปคำแนะนำราคามือสอง";

pub fn search_query(item_label: &str) -> String {
    format!("{} {}", item_label.trim(), MARKET_PRICE_KEYWORDS)
}

/// An empty result list is still embedded as `[]`.
pub fn narrative_instruction(results: &[SearchResult]) -> String {
    format!(
        "Analyze the quality of the item based on the user-provided image and the following search results. \
         Suggest a resell price range for the item in Thai Baht. \
         Consider the item's condition from the image and the prices found in the search results. \
         Search Results: {}. Provide the answer in Thai. {}",
        results_json(results),
        NARRATIVE_OUTPUT_DIRECTIVE
    )
}

pub fn structured_instruction(results: &[SearchResult]) -> String {
    let context = if results.is_empty() {
        "No search results are available; rely on the image alone.".to_string()
    } else {
        format!("Search Results: {}.", results_json(results))
    };
    format!(
        "Analyze the item in the user-provided image and estimate its second-hand resale price in Thai Baht. \
         Consider the item's condition from the image and the prices found in the search results. {context} \
         Respond with only a JSON object, no markdown and no extra text, with exactly these keys: \
         \"item_name\" (string), \"rating_stars\" (number from 0 to 5 rating the item's condition), \
         \"min_price_thb\" (number), \"max_price_thb\" (number)."
    )
}

fn results_json(results: &[SearchResult]) -> String {
    serde_json::to_string(results).unwrap_or_else(|_| "[]".to_string())
}
