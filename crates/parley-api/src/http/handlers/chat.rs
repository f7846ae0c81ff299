//! Turn and history handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::turn::TurnRequest;
use parley_types::chat::{Message, MessageRole};

use crate::http::error::ApiError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TurnBody {
    pub chat_id: Option<Uuid>,
    pub prompt: String,
    #[serde(default)]
    pub image_refs: Vec<String>,
    #[serde(default)]
    pub voice_refs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub chat_id: Uuid,
    pub response: String,
}

/// POST /api/v1/chat - Run one conversation turn.
pub async fn post_turn(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<TurnBody>,
) -> Result<Json<TurnResponse>, ApiError> {
    if body.prompt.is_empty() && body.image_refs.is_empty() && body.voice_refs.is_empty() {
        return Err(ApiError::Validation("prompt must not be empty".to_string()));
    }

    let outcome = state
        .engine
        .run(
            user_id,
            TurnRequest {
                chat_id: body.chat_id,
                prompt: body.prompt,
                image_refs: body.image_refs,
                voice_refs: body.voice_refs,
            },
        )
        .await?;

    Ok(Json(TurnResponse { chat_id: outcome.chat_id, response: outcome.response }))
}

/// Client-facing message projection: no system messages, no internal
/// transcription fields.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub role: MessageRole,
    pub content: String,
    pub image_refs: Vec<String>,
    pub voice_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageView {
    fn from(m: Message) -> Self {
        Self {
            role: m.role,
            content: m.content,
            image_refs: m.image_refs,
            voice_refs: m.voice_refs,
            created_at: m.created_at,
        }
    }
}

/// GET /api/v1/chat/{id}/messages - Ordered history of an owned chat.
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let messages = state.chats.history_for_user(&user_id, &chat_id).await?;
    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}
