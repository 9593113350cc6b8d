//! Conversation persistence behind one trait.
//!
//! The chat controller only sees `ConversationStateStore`. Adapters:
//! - `SqliteConversationStore`: local database (also backs the HTTP API)
//! - `HttpConversationStore`: remote load/save endpoints
//! - `MemoryConversationStore`: process-local, for embedding and tests

mod http;
mod memory;
mod sqlite;

pub use http::HttpConversationStore;
pub use memory::MemoryConversationStore;
pub use sqlite::SqliteConversationStore;

use std::future::Future;

use thiserror::Error;

use crate::api::types::WireError;
use crate::db::DatabaseError;
use crate::models::enums::MoodLabel;
use crate::models::{Conversation, Message, MoodProfile};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store rejected the request: {0}")]
    Rejected(String),

    #[error("Invalid payload: {0}")]
    Wire(#[from] WireError),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Loads and saves one participant's conversation.
///
/// Callers must not issue a load while a save for the same participant
/// is still pending; the controller flushes its queue before reloading.
pub trait ConversationStateStore: Send + Sync + 'static {
    /// Full history plus last badge. Unknown participants load as empty.
    fn load_conversation(
        &self,
        participant_id: &str,
    ) -> impl Future<Output = Result<Conversation, StoreError>> + Send;

    /// Append messages in order, record the analysis (when the batch
    /// carries one) and the badge. Messages whose id is already stored
    /// for the participant are skipped.
    fn append_messages(
        &self,
        participant_id: &str,
        messages: Vec<Message>,
        profile: Option<MoodProfile>,
        current_mood: MoodLabel,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
