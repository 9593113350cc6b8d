//! Conversation persistence endpoints, the server side of
//! `HttpConversationStore`.
//!
//! - `GET /api/conversations/:participant_id`: full history plus badge
//! - `POST /api/conversations/:participant_id`: append one save batch
//! - `GET /api/conversations/:participant_id/moods`: recent analyses

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, LoadResponse, SaveRequest, SaveResponse};
use crate::models::{Message, MoodRecord};
use crate::store::ConversationStateStore;

pub const MAX_PARTICIPANT_ID_CHARS: usize = 128;
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
pub const MAX_HISTORY_LIMIT: u32 = 200;

/// `GET /api/conversations/:participant_id`: unknown participants load empty.
pub async fn load(
    State(ctx): State<ApiContext>,
    Path(participant_id): Path<String>,
) -> Result<Json<LoadResponse>, ApiError> {
    check_participant(&participant_id)?;
    let conversation = ctx.store.load_conversation(&participant_id).await?;
    Ok(Json(LoadResponse::from_conversation(&conversation)))
}

/// `POST /api/conversations/:participant_id`: messages missing a timestamp
/// are stamped with the receive time.
pub async fn save(
    State(ctx): State<ApiContext>,
    Path(participant_id): Path<String>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    check_participant(&participant_id)?;

    let received_at = Utc::now();
    let messages = req
        .messages
        .into_iter()
        .map(|wire| wire.into_message(Some(received_at)))
        .collect::<Result<Vec<Message>, _>>()?;

    ctx.store
        .append_messages(&participant_id, messages, req.mood_analysis, req.current_mood)
        .await?;

    Ok(Json(SaveResponse {
        success: true,
        error: None,
    }))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// `GET /api/conversations/:participant_id/moods?limit=N`: newest first.
pub async fn moods(
    State(ctx): State<ApiContext>,
    Path(participant_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MoodRecord>>, ApiError> {
    check_participant(&participant_id)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let history = ctx.store.mood_history(&participant_id, limit).await?;
    Ok(Json(history))
}

fn check_participant(participant_id: &str) -> Result<(), ApiError> {
    if participant_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Participant id cannot be empty".into()));
    }
    if participant_id.chars().count() > MAX_PARTICIPANT_ID_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Participant id too long (max {MAX_PARTICIPANT_ID_CHARS} chars)"
        )));
    }
    Ok(())
}
