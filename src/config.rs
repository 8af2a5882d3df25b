use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};
use crate::proxy::HF_API_URL;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Bearer token for the inference API. `None` sends no Authorization header.
    pub hf_api_key: Option<String>,
    pub hf_api_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hf_api_key = lookup("HF_API_KEY").filter(|key| !key.is_empty());

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            hf_api_key,
            hf_api_url: HF_API_URL.to_string(),
        })
    }
}
