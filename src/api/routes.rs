use axum::{
    routing::post,
    Router,
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use serde_json::Value;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::{Result, AppError};
use crate::api::models::{ScrapeRequest, ScrapeResponse};
use crate::api::response;
use crate::scraper::{fetch_html, extract_page};
use crate::proxy::forward_chat;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/chat/hf", post(chat_hf_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn scrape_handler(
    payload: std::result::Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScrapeResponse>)> {
    let Json(req) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let url = validate_url(req.url)?;

    tracing::info!(%url, "Processing scrape request");
    let start_time = std::time::Instant::now();

    match process_scrape_request(&url).await {
        Ok(scraped) => {
            tracing::debug!(%url, elapsed = ?start_time.elapsed(), chars = scraped.content.chars().count(), "Scrape complete");
            Ok(response::success(scraped))
        }
        Err(err) => {
            tracing::error!(%url, error = %err, "Scrape error");
            Err(err)
        }
    }
}

fn validate_url(url: Option<String>) -> Result<String> {
    let url = match url {
        Some(url) if !url.is_empty() => url,
        _ => return Err(AppError::Validation("No URL provided".to_string())),
    };

    if !url.starts_with("http") {
        return Err(AppError::Validation(
            "Please provide a valid URL starting with http".to_string(),
        ));
    }

    Ok(url)
}

async fn process_scrape_request(url: &str) -> Result<ScrapeResponse> {
    let html = fetch_html(url).await?;
    let page = extract_page(&html, url);

    Ok(ScrapeResponse {
        source: url.to_string(),
        title: page.title,
        content: page.content,
    })
}

async fn chat_hf_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(payload) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let start_time = std::time::Instant::now();
    let config = &state.config;

    match forward_chat(&config.hf_api_url, config.hf_api_key.as_deref(), &payload).await {
        Ok(reply) => {
            tracing::debug!(elapsed = ?start_time.elapsed(), "Chat forwarded");
            Ok(response::success(reply))
        }
        Err(err) => {
            tracing::error!(error = %err, "HF proxy error");
            Err(err)
        }
    }
}
