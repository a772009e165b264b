pub mod analysis;
pub mod checker;
pub mod config;
pub mod error;
pub mod image;
pub mod prompts;
pub mod search;
pub mod types;
pub mod vision;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use analysis::{Analysis, AnalysisResult};
pub use checker::{CheckerOptions, IdentifyReport, PriceChecker, PriceReport, Stage, UsageReport};
pub use config::Config;
pub use error::{PriceCheckError, ValidationError};
pub use image::ImageReference;
pub use search::{SerpApiSearcher, WebSearcher};
pub use types::{
    AnalysisMode, IdentifyStrategy, LlmResponse, SearchFailurePolicy, SearchResult,
};
pub use vision::{ArkVision, VisionModel};
