use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use super::{ConversationStateStore, StoreError};
use crate::models::enums::MoodLabel;
use crate::models::{Conversation, Message, MoodProfile};

/// Process-local store. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryConversationStore {
    conversations: Arc<Mutex<HashMap<String, Conversation>>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStateStore for MemoryConversationStore {
    fn load_conversation(
        &self,
        participant_id: &str,
    ) -> impl Future<Output = Result<Conversation, StoreError>> + Send {
        let result = self
            .conversations
            .lock()
            .map_err(|_| StoreError::LockPoisoned)
            .map(|map| {
                map.get(participant_id)
                    .cloned()
                    .unwrap_or_else(|| Conversation::new(participant_id))
            });
        std::future::ready(result)
    }

    fn append_messages(
        &self,
        participant_id: &str,
        messages: Vec<Message>,
        _profile: Option<MoodProfile>,
        current_mood: MoodLabel,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self
            .conversations
            .lock()
            .map_err(|_| StoreError::LockPoisoned)
            .map(|mut map| {
                let conversation = map
                    .entry(participant_id.to_string())
                    .or_insert_with(|| Conversation::new(participant_id));
                for msg in messages {
                    if !conversation.messages.iter().any(|m| m.id == msg.id) {
                        conversation.append(msg);
                    }
                }
                conversation.current_mood = current_mood;
            });
        std::future::ready(result)
    }
}
