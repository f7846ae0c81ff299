//! Application error type mapping to HTTP status codes and the wire
//! `{kind, message}` error format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::error::{EntitlementError, RepositoryError, TurnError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credential.
    Unauthorized(String),
    /// Malformed request.
    Validation(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// A turn aborted with a typed pipeline error.
    Turn(TurnError),
    /// Generic internal error.
    Internal(String),
}

impl From<TurnError> for ApiError {
    fn from(e: TurnError) -> Self {
        ApiError::Turn(e)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<EntitlementError> for ApiError {
    fn from(e: EntitlementError) -> Self {
        match e {
            EntitlementError::NotFound => ApiError::NotFound("no entitlements for user".to_string()),
            EntitlementError::Storage(inner) => ApiError::Internal(inner.to_string()),
            other => ApiError::Turn(other.into()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Turn(e) => match e {
                TurnError::ChatNotFound => StatusCode::NOT_FOUND,
                TurnError::Forbidden => StatusCode::FORBIDDEN,
                TurnError::Exhausted | TurnError::MediaRequiresPaid => StatusCode::PAYMENT_REQUIRED,
                TurnError::UpstreamResolution(_)
                | TurnError::Transcription(_)
                | TurnError::Model(_) => StatusCode::BAD_GATEWAY,
                TurnError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Validation(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Turn(e) => e.kind(),
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Turn(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = self.message();

        if status.is_server_error() || matches!(&self, ApiError::Turn(e) if !e.is_user_actionable())
        {
            tracing::error!(kind, %message, "request failed");
        } else {
            tracing::info!(kind, %message, "request rejected");
        }

        let body = json!({ "kind": kind, "message": message });
        (status, axum::Json(body)).into_response()
    }
}
