use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// Users are created at signup and are immutable thereafter. The bearer
/// token handed to the client is stored only as a SHA-256 hash; the
/// plaintext exists exactly once, in the signup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Lowercase hex SHA-256 of the bearer token.
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serde_roundtrip() {
        let user = User {
            id: Uuid::now_v7(),
            token_hash: "ab".repeat(32),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        let parsed: User = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, user.id);
        assert_eq!(parsed.token_hash, user.token_hash);
    }
}
