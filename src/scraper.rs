use axum::http::StatusCode;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{header::CONTENT_TYPE, Client, ClientBuilder};
use scraper::{Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Upper bound on the excerpt, counted in characters.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Total time allowed for fetching a page, body included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// Shared client so repeated scrapes reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

static META_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta").expect("Failed to parse meta selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

/// Title and excerpt pulled out of a fetched page.
#[derive(Debug, PartialEq)]
pub struct Page {
    pub title: String,
    pub content: String,
}

pub async fn fetch_html(url: &str) -> Result<String> {
    let response = CLIENT.get(url).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        tracing::warn!(url, status = %response.status(), "Page returned a non-200 status");
        return Err(AppError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to fetch page".to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;

    Ok(decode_html(&bytes, content_type.as_deref()))
}

/// Decodes a page body using the `Content-Type` charset, then any
/// `<meta>` charset declaration, then UTF-8. A BOM wins over all of them.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .or_else(|| sniff_meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
    })
}

// Declarations are ASCII, so a lossy UTF-8 view is enough to find them
fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let document = Html::parse_document(&String::from_utf8_lossy(bytes));

    document.select(&META_SELECTOR).find_map(|meta| {
        let meta = meta.value();
        if let Some(charset) = meta.attr("charset") {
            return Some(charset.trim().to_string());
        }
        let is_content_type = meta
            .attr("http-equiv")
            .is_some_and(|value| value.eq_ignore_ascii_case("content-type"));
        if is_content_type {
            meta.attr("content").and_then(charset_param)
        } else {
            None
        }
    })
}

/// Collects the text of every `<p>` in document order, joined by single
/// spaces and cut to [`MAX_CONTENT_CHARS`]. Falls back to `url` for the
/// title when the document has no `<title>` element. An empty `<title>`
/// yields an empty title, not the URL.
pub fn extract_page(html: &str, url: &str) -> Page {
    let document = Html::parse_document(html);

    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|element| element.text().collect::<String>())
        .collect();
    let text = paragraphs.join(" ");

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_else(|| url.to_string());

    Page {
        title,
        content: truncate_chars(&text, MAX_CONTENT_CHARS).to_string(),
    }
}

/// Keeps the first `max` characters. Not word aware.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
