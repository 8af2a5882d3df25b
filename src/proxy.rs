use axum::http::StatusCode;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use crate::error::{AppError, Result};

/// Hosted text-generation model that chat payloads are forwarded to.
pub const HF_API_URL: &str =
    "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta";

// No request timeout here, unlike the scrape client.
static CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Posts `payload` unchanged to `endpoint` and hands back the upstream JSON.
///
/// A bearer token is attached only when `api_key` is `Some`; blank keys are
/// already dropped by [`Config`](crate::config::Config). Any
/// status other than 200 is surfaced as [`AppError::Upstream`] with the same
/// status and the raw upstream body in the message.
pub async fn forward_chat(
    endpoint: &str,
    api_key: Option<&str>,
    payload: &Value,
) -> Result<Value> {
    // `.json()` sets Content-Type: application/json
    let mut request = CLIENT.post(endpoint).json(payload);

    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let res = request.send().await?;
    let status = res.status();

    if status != reqwest::StatusCode::OK {
        let body = res.text().await?;
        tracing::warn!(%status, endpoint, "Upstream inference API returned an error");
        return Err(AppError::Upstream {
            status: StatusCode::from_u16(status.as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: format!("HF API Error: {}", body),
        });
    }

    let json: Value = res.json().await?;
    Ok(json)
}
