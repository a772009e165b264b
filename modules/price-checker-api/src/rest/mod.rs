use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use price_checker::{PriceCheckError, ValidationError};

use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    image_url: Option<String>,
}

/// Pull `imageUrl` out of the body. A body that is not valid JSON is treated
/// the same as one without the field.
fn image_url(body: Result<Json<ImageRequest>, JsonRejection>) -> Option<String> {
    match body {
        Ok(Json(req)) => req.image_url,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected request body");
            None
        }
    }
}

// --- Errors ---

/// Maps pipeline failures onto the HTTP error envelope.
pub struct ApiError {
    route: &'static str,
    error: PriceCheckError,
}

impl ApiError {
    fn new(route: &'static str, error: PriceCheckError) -> Self {
        Self { route, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self.error {
            PriceCheckError::Validation(ValidationError::Missing) => (
                StatusCode::BAD_REQUEST,
                "Image URL is required",
                "Please provide an imageUrl in the request body".to_string(),
            ),
            PriceCheckError::Validation(ValidationError::InvalidUrl(_)) => (
                StatusCode::BAD_REQUEST,
                "Invalid URL format",
                "Please provide a valid HTTP or HTTPS URL".to_string(),
            ),
            PriceCheckError::Validation(e) => {
                (StatusCode::BAD_REQUEST, "Invalid image URL", e.to_string())
            }
            e => {
                error!(route = self.route, error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    e.to_string(),
                )
            }
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

// --- Handlers ---

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "message": "Smart Price Checker API is running",
    }))
}

pub async fn api_analyze_price(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let url = image_url(body);
    let report = state
        .checker
        .check(url.as_deref())
        .await
        .map_err(|e| ApiError::new("/analyze-price", e))?;

    Ok(Json(json!({ "success": true, "data": report })))
}

pub async fn api_identify_item(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let url = image_url(body);
    let report = state
        .checker
        .identify_only(url.as_deref())
        .await
        .map_err(|e| ApiError::new("/identify-item", e))?;

    Ok(Json(json!({ "success": true, "data": report })))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "The requested endpoint does not exist",
        })),
    )
}
