use std::net::SocketAddr;

use action_extractor_extraction::LlmConfig;
use anyhow::{Context, Result};

/// Service configuration, read from the environment once at startup and
/// passed into the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
}

impl Config {
    /// Create config from environment variables.
    ///
    /// `DB_PATH`, `BIND_ADDR`, `OLLAMA_URL` and `OLLAMA_MODEL` are all
    /// optional and fall back to local defaults.
    pub fn from_env() -> Result<Self> {
        let db_path =
            std::env::var("DB_PATH").unwrap_or_else(|_| "action_items.db".to_string());

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        Ok(Self {
            db_path,
            bind_addr,
            llm: LlmConfig::from_env(),
        })
    }
}
