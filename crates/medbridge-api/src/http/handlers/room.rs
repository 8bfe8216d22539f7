//! Room handlers for the REST API.
//!
//! A room is created implicitly by its first message. Each room has one
//! server-side `SessionContext`, so concurrent posts to the same room are
//! serialized and audio dedup works across requests.

use axum::Json;
use axum::extract::{Path, Query, State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use medbridge_core::conversation::Intake;
use medbridge_core::conversation::search::HighlightStyle;
use medbridge_types::message::{RoomId, RoomSummary, SpeakerRole};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;
use crate::view::{IntakeView, MessageView, SummaryView};

/// Request body for posting a turn.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    /// Speaker; keeps the room session's current role when omitted.
    #[serde(default)]
    pub role: Option<SpeakerRole>,
    #[serde(default)]
    pub text: Option<String>,
    /// Keeps the room session's current language when omitted.
    #[serde(default)]
    pub target_language: Option<String>,
    /// Recorded clip, base64 encoded.
    #[serde(default)]
    pub audio_base64: Option<String>,
}

/// Query parameters for the message log.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    /// Case-insensitive substring filter.
    #[serde(default)]
    pub q: Option<String>,
    /// Wrap matches in `**`.
    #[serde(default)]
    pub highlight: bool,
    /// Embed audio clips as base64.
    #[serde(default)]
    pub audio: bool,
}

/// GET /api/v1/rooms - List rooms with stored history.
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoomSummary>>>, AppError> {
    let timer = RequestTimer::start();

    let rooms = state.controller.rooms().await?;
    Ok(timer.respond(rooms))
}

/// GET /api/v1/rooms/{room}/messages - A room's log in conversation order.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<ApiResponse<Vec<MessageView>>>, AppError> {
    let timer = RequestTimer::start();
    let room = RoomId::from(room);
    let search = query.q.as_deref().filter(|q| !q.trim().is_empty());

    let messages = state.controller.history(&room, search).await?;
    let views = messages
        .into_iter()
        .map(|m| {
            let view = MessageView::new(m, query.audio);
            match search {
                Some(q) if query.highlight => view.highlighted(q, HighlightStyle::MARKDOWN),
                _ => view,
            }
        })
        .collect();
    Ok(timer.respond(views))
}

/// POST /api/v1/rooms/{room}/messages - Submit one turn.
///
/// Returns `status: persisted` with the stored row, or `status: ignored`
/// when there was nothing new to record.
pub async fn post_message(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Result<Json<ApiResponse<IntakeView>>, AppError> {
    let timer = RequestTimer::start();
    let room = RoomId::from(room);

    let language = match body.target_language.as_deref() {
        Some(lang) => Some(
            state
                .language(Some(lang))
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        None => None,
    };
    let audio = match body.audio_base64.as_deref() {
        Some(encoded) => Some(
            BASE64
                .decode(encoded.trim())
                .map_err(|e| AppError::Validation(format!("invalid audio_base64: {e}")))?,
        ),
        None => None,
    };
    let intake = Intake {
        typed_text: body.text,
        audio,
    };

    let session = state.session_for(&room);
    let mut ctx = session.lock().await;
    if let Some(role) = body.role {
        ctx.role = role;
    }
    if let Some(language) = language {
        ctx.target_language = language;
    }
    let outcome = state.controller.submit(&mut ctx, intake).await?;
    drop(ctx);

    Ok(timer.respond(IntakeView::new(outcome, false)))
}

/// POST /api/v1/rooms/{room}/summary - Structured clinical summary.
pub async fn summarize_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<ApiResponse<SummaryView>>, AppError> {
    let timer = RequestTimer::start();

    let outcome = state.controller.summarize(&RoomId::from(room)).await?;
    Ok(timer.respond(SummaryView::from(outcome)))
}
