use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub source: String,
    pub title: String,
    pub content: String,
}
