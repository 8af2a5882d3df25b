pub mod api;
pub mod config;
pub mod error;
pub mod proxy;
pub mod scraper;

use std::net::SocketAddr;
use std::sync::Arc;
use config::Config;

/// Read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

pub fn startup_banner(addr: SocketAddr) -> String {
    format!("Starting InferMate Backend on {}...", addr)
}
