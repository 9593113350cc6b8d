pub mod api;
pub mod config;
pub mod controller;
pub mod db;
pub mod engine;
pub mod models;
pub mod session;
pub mod store;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::{ConfigError, ServerConfig};
use crate::store::{SqliteConversationStore, StoreError};

pub use controller::{ChatSessionController, Turn};
pub use engine::{MoodAnalyzer, ResponseGenerator};
pub use session::{ChatError, ChatSession};
pub use store::ConversationStateStore;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot open conversation store: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

/// Serve the API until Ctrl-C.
pub async fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let server_config = ServerConfig::from_env()?;
    let store = SqliteConversationStore::open(&server_config.database_path)?;

    let mut server = api::start_api_server(ApiContext::new(store), server_config.bind_addr)
        .await
        .map_err(RunError::Server)?;
    tracing::info!(url = %server.base_url(), "Listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    Ok(())
}
