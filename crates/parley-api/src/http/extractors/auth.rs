//! Bearer-token authentication extractor.
//!
//! Extracts the token from `Authorization: Bearer <token>`, hashes it with
//! SHA-256, and resolves it to a user id against the `users` table. Only
//! the hash is ever stored.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use parley_core::repository::user::UserRepository;

use crate::http::error::ApiError;
use crate::state::AppState;

/// The authenticated requester. Extracting this validates the bearer token.
pub struct AuthUser(pub Uuid);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let token_hash = hash_token(&token);

        match state.users.find_by_token_hash(&token_hash).await {
            Ok(Some(user_id)) => Ok(AuthUser(user_id)),
            Ok(None) => Err(ApiError::Unauthorized("invalid token".to_string())),
            Err(e) => Err(ApiError::Internal(format!("token lookup failed: {e}"))),
        }
    }
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer_token(parts: &Parts) -> Result<String, ApiError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Err(ApiError::Unauthorized("missing Authorization header".to_string()));
    };
    let auth = auth
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header encoding".to_string()))?;
    match auth.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::Unauthorized("invalid Authorization token".to_string())),
    }
}

/// Compute the SHA-256 hash of a bearer token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_hex_and_deterministic() {
        let a = hash_token("token-1");
        let b = hash_token("token-1");
        let c = hash_token("token-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
