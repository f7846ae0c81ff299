//! SQLite user repository implementation.

use parley_core::repository::user::UserRepository;
use parley_types::error::RepositoryError;
use parley_types::user::User;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (id, token_hash, created_at) VALUES (?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.token_hash)
            .bind(user.created_at.to_rfc3339())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Uuid>, RepositoryError> {
        let row = sqlx::query("SELECT id FROM users WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let id: String = row
                    .try_get("id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let id = Uuid::parse_str(&id)
                    .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::tests::test_pool;
    use chrono::Utc;

    #[tokio::test]
    async fn create_and_find_by_token_hash() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let user = User {
            id: Uuid::now_v7(),
            token_hash: "a1".repeat(32),
            created_at: Utc::now(),
        };
        repo.create_user(&user).await.unwrap();

        let found = repo.find_by_token_hash(&user.token_hash).await.unwrap();
        assert_eq!(found, Some(user.id));

        let missing = repo.find_by_token_hash("nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn token_hash_is_unique() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let hash = "b2".repeat(32);
        let first = User { id: Uuid::now_v7(), token_hash: hash.clone(), created_at: Utc::now() };
        let second = User { id: Uuid::now_v7(), token_hash: hash, created_at: Utc::now() };

        repo.create_user(&first).await.unwrap();
        assert!(repo.create_user(&second).await.is_err());
    }
}
