//! Shared types for the HTTP layer: router context and the load/save
//! wire shapes (also spoken by `HttpConversationStore`).

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::engine::{MoodAnalyzer, ResponseGenerator};
use crate::models::enums::{MessageAuthor, MoodLabel, Tone};
use crate::models::{Conversation, Message, MessageId, MoodProfile};
use crate::store::SqliteConversationStore;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub store: SqliteConversationStore,
    pub analyzer: MoodAnalyzer,
    pub generator: ResponseGenerator,
    /// Template picks for `/mood/respond`. Seedable for tests.
    pub rng: Arc<Mutex<StdRng>>,
}

impl ApiContext {
    pub fn new(store: SqliteConversationStore) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    pub fn with_rng(store: SqliteConversationStore, rng: StdRng) -> Self {
        Self {
            store,
            analyzer: MoodAnalyzer::new(),
            generator: ResponseGenerator::default(),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Load / save wire format
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Message id cannot be empty")]
    EmptyMessageId,

    #[error("Message {0} has no timestamp")]
    MissingTimestamp(String),
}

/// A message as exchanged with the load/save endpoints.
///
/// `timestamp`, `mood` and `sentiment` are optional on save; load
/// always fills `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub id: String,
    pub content: String,
    pub is_from_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Tone label of assistant messages. Unknown labels read as absent.
    #[serde(
        default,
        deserialize_with = "lenient_tone",
        skip_serializing_if = "Option::is_none"
    )]
    pub mood: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        WireMessage {
            id: m.id.as_str().to_string(),
            content: m.content.clone(),
            is_from_user: m.is_from_user(),
            timestamp: Some(m.timestamp),
            mood: m.tone,
            sentiment: m.sentiment,
        }
    }
}

impl WireMessage {
    /// Convert an incoming message. A missing timestamp is filled with
    /// `received_at` when allowed (save) and rejected otherwise (load).
    pub fn into_message(self, received_at: Option<DateTime<Utc>>) -> Result<Message, WireError> {
        let id = MessageId::from(self.id);
        if id.is_blank() {
            return Err(WireError::EmptyMessageId);
        }
        let timestamp = self
            .timestamp
            .or(received_at)
            .ok_or_else(|| WireError::MissingTimestamp(id.to_string()))?;
        let author = if self.is_from_user {
            MessageAuthor::User
        } else {
            MessageAuthor::Assistant
        };
        Ok(Message {
            id,
            author,
            content: self.content,
            timestamp,
            tone: if self.is_from_user { None } else { self.mood },
            sentiment: if self.is_from_user { None } else { self.sentiment },
        })
    }
}

/// Tone labels written by other clients may be English or unknown.
/// Aliases resolve through `Tone`; anything else becomes `None` so one
/// odd label never fails a whole load.
fn lenient_tone<'de, D>(deserializer: D) -> Result<Option<Tone>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|label| match label.parse::<Tone>() {
        Ok(tone) => Some(tone),
        Err(_) => {
            tracing::debug!(label = %label, "Ignoring unknown tone label");
            None
        }
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireConversation {
    pub mood: MoodLabel,
}

/// Body of `GET /api/conversations/:participant_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResponse {
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<WireConversation>,
}

impl LoadResponse {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            success: true,
            messages: conversation.messages.iter().map(WireMessage::from).collect(),
            conversation: Some(WireConversation {
                mood: conversation.current_mood,
            }),
        }
    }

    pub fn into_conversation(self, participant_id: &str) -> Result<Conversation, WireError> {
        let mut conversation = Conversation::new(participant_id);
        for wire in self.messages {
            conversation.append(wire.into_message(None)?);
        }
        conversation.current_mood = self.conversation.map(|c| c.mood).unwrap_or_default();
        Ok(conversation)
    }
}

/// Body of `POST /api/conversations/:participant_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub messages: Vec<WireMessage>,
    /// Analysis of the batch's user turn. Absent for batches with no
    /// analysed turn (e.g. quick requests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_analysis: Option<MoodProfile>,
    pub current_mood: MoodLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
