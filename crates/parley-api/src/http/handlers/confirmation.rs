//! Purchase confirmation handler.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub confirmed: bool,
}

/// GET /api/v1/purchases/{transaction_id}/confirmation - Whether a billing
/// transaction has been reconciled for the caller.
pub async fn confirm_purchase(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(transaction_id): Path<String>,
) -> Result<Json<ConfirmationResponse>, ApiError> {
    let confirmed = state
        .entitlements
        .is_transaction_processed(&user_id, &transaction_id)
        .await?;
    Ok(Json(ConfirmationResponse { confirmed }))
}
