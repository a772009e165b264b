use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use price_checker::{Config, PriceChecker};

mod rest;

pub struct AppState {
    pub checker: PriceChecker,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(rest::health))
        .route("/analyze-price", post(rest::api_analyze_price))
        .route("/identify-item", post(rest::api_identify_item))
        .fallback(rest::not_found)
        .method_not_allowed_fallback(rest::not_found)
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only (no bodies, no headers)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new("price_checker=info,price_checker_api=info,ai_client=info,serpapi_client=info,tower_http=info")
    })?;

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");

    let checker = PriceChecker::from_config(&config)?;
    let app = router(Arc::new(AppState { checker }));

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Smart Price Checker API starting on {addr}");
    info!("Health check: http://{addr}/health");
    info!("Main endpoint: POST http://{addr}/analyze-price");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
