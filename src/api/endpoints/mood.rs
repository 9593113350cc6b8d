//! Mood engine endpoints.
//!
//! - `POST /api/mood/analyze`: text to mood profile
//! - `POST /api/mood/respond`: intent plus optional text to a chat reply

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::engine::{ChatReply, Intent, ResponseContext};
use crate::models::enums::{MoodLabel, TimeOfDay};
use crate::models::MoodProfile;

/// Longest text accepted for analysis, in characters.
pub const MAX_TEXT_CHARS: usize = 2000;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// `POST /api/mood/analyze`: run the analyzer. Blank text yields the baseline.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<MoodProfile>, ApiError> {
    check_length(&req.text)?;
    Ok(Json(ctx.analyzer.analyze(&req.text)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub intent: Intent,
    #[serde(default)]
    pub participant_name: String,
    /// Analysed when present. Otherwise a personal intent's trigger is used.
    pub text: Option<String>,
    /// Defaults to the server's local clock.
    pub time_of_day: Option<TimeOfDay>,
    /// Conversation's last badge, used when there is no text to analyse.
    #[serde(default)]
    pub recent_mood: MoodLabel,
}

#[derive(Serialize)]
pub struct RespondResponse {
    pub reply: ChatReply,
    pub profile: MoodProfile,
}

/// `POST /api/mood/respond`: pick and fill a template for the intent.
pub async fn respond(
    State(ctx): State<ApiContext>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, ApiError> {
    let text = match (&req.text, &req.intent) {
        (Some(text), _) => Some(text.as_str()),
        (None, Intent::Personal { trigger }) => Some(trigger.as_str()),
        (None, _) => None,
    };

    let profile = match text {
        Some(text) => {
            check_length(text)?;
            ctx.analyzer.analyze(text)
        }
        None => MoodProfile::for_label(req.recent_mood),
    };

    let context = ResponseContext::new(
        req.time_of_day.unwrap_or_else(TimeOfDay::now),
        req.recent_mood,
    );
    let response = {
        let mut rng = ctx
            .rng
            .lock()
            .map_err(|_| ApiError::Internal("rng lock poisoned".into()))?;
        ctx.generator
            .respond(&req.intent, &profile, &req.participant_name, &context, &mut *rng)
    };

    tracing::debug!(intent = req.intent.kind(), mood = %profile.mood, tone = %response.tone, "Reply generated");

    Ok(Json(RespondResponse {
        reply: ChatReply::Mood(response),
        profile,
    }))
}

fn check_length(text: &str) -> Result<(), ApiError> {
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Text too long (max {MAX_TEXT_CHARS} chars)"
        )));
    }
    Ok(())
}
