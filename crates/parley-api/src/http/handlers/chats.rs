//! Chat listing handler.

use axum::extract::State;
use axum::Json;

use parley_types::chat::ChatSummary;

use crate::http::error::ApiError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/chats - `{id, title}` of the requester's chats, newest first.
pub async fn list_chats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let chats = state.chats.list_chats(&user_id).await?;
    Ok(Json(chats))
}
