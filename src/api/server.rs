//! API server lifecycle: starts/stops the axum HTTP server.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Metadata for a running API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSession {
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running API server.
pub struct ApiServer {
    pub session: ApiSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Base URL clients (including `HttpConversationStore`) should use.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.session.server_addr)
    }

    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` (port 0 picks an ephemeral port), build the router and
/// spawn the axum server in a background tokio task.
pub async fn start_api_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server on {addr}: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(ctx);

    let session = ApiSession {
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        session,
        shutdown_tx: Some(shutdown_tx),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::ChatConfig;
    use crate::controller::ChatSessionController;
    use crate::models::enums::MoodLabel;
    use crate::store::{ConversationStateStore, HttpConversationStore, SqliteConversationStore};

    async fn start_local() -> (ApiServer, SqliteConversationStore) {
        let store = SqliteConversationStore::in_memory().unwrap();
        let server = start_api_server(
            ApiContext::new(store.clone()),
            "127.0.0.1:0".parse().unwrap(),
        )
        .await
        .expect("server should start");
        (server, store)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (mut server, _store) = start_local().await;
        assert!(server.session.port > 0);
        assert!(!server.session.started_at.is_empty());

        let resp = reqwest::get(format!("{}/api/health", server.base_url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        // Give server time to stop
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (mut server, _store) = start_local().await;
        let resp = reqwest::get(format!("{}/nonexistent", server.base_url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        server.shutdown();
    }

    #[tokio::test]
    async fn http_store_round_trips_through_server() {
        let (mut server, local) = start_local().await;
        let remote = Arc::new(
            HttpConversationStore::new(&server.base_url(), Duration::from_secs(5)).unwrap(),
        );

        let mut chat = ChatSessionController::new(remote.clone(), "ana-1", "Ana", ChatConfig::immediate());
        chat.open().await;
        let turn = chat.send("me siento triste y sin ganas").await.unwrap();
        chat.flush_persistence().await;

        let stored = local.load_conversation("ana-1").await.unwrap();
        assert_eq!(stored.messages.len(), 2);
        assert_eq!(stored.messages[0].id, turn.user.id);
        assert_eq!(stored.current_mood, MoodLabel::Sad);

        let loaded = remote.load_conversation("ana-1").await.unwrap();
        assert_eq!(loaded.messages, stored.messages);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (mut server, _store) = start_local().await;
        server.shutdown();
        server.shutdown(); // Second call should be safe
    }
}
