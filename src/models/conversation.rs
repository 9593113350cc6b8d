use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MessageAuthor, MoodLabel, Tone};
use super::mood::MoodProfile;

/// Opaque message identifier, unique within one conversation.
///
/// Locally created messages get a UUID v4. Ids loaded from a store are
/// kept verbatim, whatever their shape (e.g. millisecond timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: MessageAuthor,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Assistant messages only: tone of the template that produced it.
    pub tone: Option<Tone>,
    /// Assistant messages only: sentiment of the triggering analysis.
    pub sentiment: Option<f64>,
}

impl Message {
    pub fn from_user(content: &str) -> Self {
        Self {
            id: MessageId::generate(),
            author: MessageAuthor::User,
            content: content.trim().to_string(),
            timestamp: Utc::now(),
            tone: None,
            sentiment: None,
        }
    }

    pub fn from_assistant(content: impl Into<String>, tone: Tone, sentiment: Option<f64>) -> Self {
        Self {
            id: MessageId::generate(),
            author: MessageAuthor::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            tone: Some(tone),
            sentiment: sentiment.map(|s| s.clamp(-1.0, 1.0)),
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.author == MessageAuthor::User
    }
}

/// One participant's full, append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub participant_id: String,
    pub messages: Vec<Message>,
    pub current_mood: MoodLabel,
}

impl Conversation {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            messages: Vec::new(),
            current_mood: MoodLabel::Neutral,
        }
    }

    /// Append, keeping timestamps non-decreasing. A message stamped
    /// earlier than the current tail is moved up to the tail's instant.
    pub fn append(&mut self, mut message: Message) {
        if let Some(last) = self.messages.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }
        self.messages.push(message);
    }

    /// Update the badge from an analysis. Returns true when it changed.
    /// Insignificant profiles never overwrite the badge.
    pub fn observe(&mut self, profile: &MoodProfile) -> bool {
        if !profile.is_significant() || profile.mood == self.current_mood {
            return false;
        }
        self.current_mood = profile.mood;
        true
    }
}
