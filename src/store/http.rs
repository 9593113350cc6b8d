use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::Url;

use super::{ConversationStateStore, StoreError};
use crate::api::types::{LoadResponse, SaveRequest, SaveResponse, WireMessage};
use crate::models::enums::MoodLabel;
use crate::models::{Conversation, Message, MoodProfile};

/// Talks to a remote service exposing the conversation load/save endpoints
/// (`GET`/`POST {base}/api/conversations/{participant_id}`).
#[derive(Clone)]
pub struct HttpConversationStore {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpConversationStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Rejected(format!("invalid base url {base_url:?}: {e}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    fn conversation_url(&self, participant_id: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::Rejected(format!("base url cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "conversations", participant_id]);
        Ok(url)
    }
}

impl ConversationStateStore for HttpConversationStore {
    fn load_conversation(
        &self,
        participant_id: &str,
    ) -> impl Future<Output = Result<Conversation, StoreError>> + Send {
        async move {
            let url = self.conversation_url(participant_id)?;
            let body: LoadResponse = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if !body.success {
                return Err(StoreError::Rejected("load reported failure".into()));
            }
            Ok(body.into_conversation(participant_id)?)
        }
    }

    fn append_messages(
        &self,
        participant_id: &str,
        messages: Vec<Message>,
        profile: Option<MoodProfile>,
        current_mood: MoodLabel,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            let url = self.conversation_url(participant_id)?;
            let request = SaveRequest {
                messages: messages.iter().map(WireMessage::from).collect(),
                mood_analysis: profile,
                current_mood,
            };

            let started = Utc::now();
            let body: SaveResponse = self
                .client
                .post(url)
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if !body.success {
                return Err(StoreError::Rejected(
                    body.error.unwrap_or_else(|| "save reported failure".into()),
                ));
            }
            tracing::debug!(
                participant_id,
                count = request.messages.len(),
                elapsed_ms = (Utc::now() - started).num_milliseconds(),
                "Remote save acknowledged"
            );
            Ok(())
        }
    }
}
