use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, Level};

use action_extractor_api::{router, AppState, Config, Database};
use action_extractor_extraction::{HeuristicExtractor, LlmExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Action Item Extractor API v0.1.0");

    let config = Config::from_env()?;

    // Create the database directory if it doesn't exist
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(&config.db_path)?;
    info!("Database initialized at: {}", config.db_path);

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        heuristic: Arc::new(HeuristicExtractor::new()),
        llm: Arc::new(LlmExtractor::new(config.llm.clone())),
    };

    let app = router(state);

    info!("Starting HTTP server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
