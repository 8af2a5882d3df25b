#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use infermate_backend::{
    api::routes::create_router, config::Config, scraper::FETCH_TIMEOUT, AppState,
};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Starts the backend with the given upstream endpoint and API key.
pub async fn spawn_backend(hf_api_url: String, hf_api_key: Option<&str>) -> String {
    let config = Config {
        server_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        hf_api_key: hf_api_key.map(str::to_string),
        hf_api_url,
    };
    serve(create_router(AppState { config: Arc::new(config) })).await
}

/// Stand-in for both the pages being scraped and the inference API.
pub async fn spawn_fake_upstream() -> String {
    let app = Router::new()
        .route("/example", get(example_page))
        .route("/untitled", get(untitled_page))
        .route("/long", get(long_page))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
        .route("/user-agent", get(echo_user_agent))
        .route("/latin1", get(latin1_page))
        .route("/slow", get(slow_page))
        .route("/ok", post(|| async { Json(json!({ "ok": true })) }))
        .route("/echo", post(echo_request))
        .route(
            "/overloaded",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        )
        .route(
            "/not-json",
            post(|| async { (StatusCode::OK, "plain text reply") }),
        );
    serve(app).await
}

async fn example_page() -> Html<&'static str> {
    Html("<html><head><title>Example</title></head><body><p>Hello</p></body></html>")
}

async fn untitled_page() -> Html<&'static str> {
    Html("<html><body><h1>Heading</h1><p>One</p><section><p>Two <em>three</em></p></section></body></html>")
}

async fn long_page() -> Html<String> {
    let paragraph = "word ".repeat(800);
    Html(format!(
        "<html><head><title>Long</title></head><body><p>{paragraph}</p><p>{paragraph}</p></body></html>"
    ))
}

/// ISO-8859-1 body whose charset is only declared in a `<meta>` tag.
async fn latin1_page() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html")],
        b"<html><head><meta charset=\"iso-8859-1\"><title>Caf\xE9</title></head><body><p>caf\xE9</p></body></html>".to_vec(),
    )
}

/// Answers only after the fetch timeout has passed.
async fn slow_page() -> Html<&'static str> {
    tokio::time::sleep(FETCH_TIMEOUT + std::time::Duration::from_secs(5)).await;
    Html("<title>Late</title><p>too late</p>")
}

async fn echo_user_agent(headers: HeaderMap) -> impl IntoResponse {
    let agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Html(format!("<title>UA</title><p>{agent}</p>"))
}

async fn echo_request(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "authorization": header("authorization"),
        "content_type": header("content-type"),
        "body": body,
    }))
}
