use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::{ConversationStateStore, StoreError};
use crate::db::{self, repository};
use crate::models::enums::MoodLabel;
use crate::models::{Conversation, Message, MoodProfile, MoodRecord};

/// SQLite-backed store. One connection, serialized behind a mutex, with
/// all database work moved off the async executor.
#[derive(Clone)]
pub struct SqliteConversationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConversationStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Conversation store opened");
        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Recent analyses for the admin mood log, newest first.
    pub async fn mood_history(
        &self,
        participant_id: &str,
        limit: u32,
    ) -> Result<Vec<MoodRecord>, StoreError> {
        let participant_id = participant_id.to_string();
        self.with_connection(move |conn| {
            Ok(repository::get_mood_history(conn, &participant_id, limit)?)
        })
        .await
    }

    async fn with_connection<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            work(&mut guard)
        })
        .await?
    }
}

impl ConversationStateStore for SqliteConversationStore {
    fn load_conversation(
        &self,
        participant_id: &str,
    ) -> impl Future<Output = Result<Conversation, StoreError>> + Send {
        let participant_id = participant_id.to_string();
        self.with_connection(move |conn| {
            Ok(repository::load_conversation(conn, &participant_id)?)
        })
    }

    fn append_messages(
        &self,
        participant_id: &str,
        messages: Vec<Message>,
        profile: Option<MoodProfile>,
        current_mood: MoodLabel,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let participant_id = participant_id.to_string();
        self.with_connection(move |conn| {
            let written = repository::append_to_conversation(
                conn,
                &participant_id,
                &messages,
                profile.as_ref(),
                current_mood,
            )?;
            tracing::debug!(
                participant_id = %participant_id,
                written,
                mood = %current_mood,
                "Conversation appended"
            );
            Ok(())
        })
    }
}
