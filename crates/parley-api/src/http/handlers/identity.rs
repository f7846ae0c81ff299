//! Signup and launch handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use parley_core::repository::user::UserRepository;
use parley_infra::config::SIGNUP_FREE_MESSAGES;
use parley_types::user::User;

use crate::http::error::ApiError;
use crate::http::extractors::auth::{hash_token, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub access_token: String,
}

/// POST /api/v1/signup - Issue a bearer token bound to a fresh user with a
/// starting free balance.
///
/// The plaintext token exists only in this response; the store keeps its
/// SHA-256 hash.
pub async fn sign_up(State(state): State<AppState>) -> Result<Json<SignUpResponse>, ApiError> {
    let token = Uuid::new_v4().to_string();
    let user = User {
        id: Uuid::now_v7(),
        token_hash: hash_token(&token),
        created_at: Utc::now(),
    };

    state
        .users
        .create_user(&user)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create user: {e}")))?;
    state
        .entitlements
        .init_for_user(&user.id, SIGNUP_FREE_MESSAGES)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to initialize entitlements: {e}")))?;

    tracing::info!(user_id = %user.id, "user signed up");
    Ok(Json(SignUpResponse { access_token: token }))
}

#[derive(Debug, Serialize)]
pub struct LaunchResponse {
    pub user_id: Uuid,
    pub free_messages_left: i64,
    pub paid_messages_left: i64,
    pub is_using_paid: bool,
}

/// GET /api/v1/launch - Balance snapshot for the authenticated user.
pub async fn launch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<LaunchResponse>, ApiError> {
    let ent = state.entitlements.entitlements(&user_id).await?;
    Ok(Json(LaunchResponse {
        user_id: ent.user_id,
        free_messages_left: ent.free_messages_left,
        paid_messages_left: ent.paid_messages_left,
        is_using_paid: ent.is_using_paid,
    }))
}
