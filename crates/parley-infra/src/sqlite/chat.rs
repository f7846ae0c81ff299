//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, rfc3339 TEXT
//! datetimes. Media refs are stored as JSON arrays in TEXT columns.

use chrono::{DateTime, Utc};
use parley_core::repository::chat::ChatRepository;
use parley_types::chat::{Chat, ChatSummary, Message, MessageRole};
use parley_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MessageRow {
    id: String,
    chat_id: String,
    role: String,
    content: String,
    image_refs: String,
    voice_refs: String,
    voice_transcription: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            image_refs: row.try_get("image_refs")?,
            voice_refs: row.try_get("voice_refs")?,
            voice_transcription: row.try_get("voice_transcription")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let chat_id = Uuid::parse_str(&self.chat_id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;
        let image_refs = parse_refs(&self.image_refs)?;
        let voice_refs = parse_refs(&self.voice_refs)?;

        Ok(Message {
            id,
            chat_id,
            role,
            content: self.content,
            image_refs,
            voice_refs,
            voice_transcription: self.voice_transcription.filter(|t| !t.is_empty()),
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn parse_refs(s: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(s).map_err(|e| RepositoryError::Query(format!("invalid refs column: {e}")))
}

fn encode_refs(refs: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(refs).map_err(|e| RepositoryError::Query(e.to_string()))
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, chat: &Chat, system_message: &Message) -> Result<(), RepositoryError> {
        // Chat row and opening system message land in one transaction: no
        // chat is ever observable without its system message.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("INSERT INTO chats (id, user_id, title, created_at) VALUES (?, ?, ?, ?)")
            .bind(chat.id.to_string())
            .bind(chat.user_id.to_string())
            .bind(&chat.title)
            .bind(chat.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, role, content, image_refs, voice_refs, voice_transcription, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(system_message.id.to_string())
        .bind(system_message.chat_id.to_string())
        .bind(system_message.role.to_string())
        .bind(&system_message.content)
        .bind(encode_refs(&system_message.image_refs)?)
        .bind(encode_refs(&system_message.voice_refs)?)
        .bind(&system_message.voice_transcription)
        .bind(system_message.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn chat_owner(&self, chat_id: &Uuid) -> Result<Option<Uuid>, RepositoryError> {
        let row = sqlx::query("SELECT user_id FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_id: String = row
                    .try_get("user_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let user_id = Uuid::parse_str(&user_id)
                    .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, role, content, image_refs, voice_refs, voice_transcription, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(encode_refs(&message.image_refs)?)
        .bind(encode_refs(&message.voice_refs)?)
        .bind(&message.voice_transcription)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn list_messages(
        &self,
        chat_id: &Uuid,
        include_system: bool,
    ) -> Result<Vec<Message>, RepositoryError> {
        let query = if include_system {
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC"
        } else {
            "SELECT * FROM messages WHERE chat_id = ? AND role != 'system' ORDER BY created_at ASC, id ASC"
        };

        let rows = sqlx::query(query)
            .bind(chat_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut message = MessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_message()?;
            // Cached transcriptions are internal to the model projection.
            if !include_system {
                message.voice_transcription = None;
            }
            messages.push(message);
        }
        Ok(messages)
    }

    async fn list_chats_for_user(&self, user_id: &Uuid) -> Result<Vec<ChatSummary>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, title FROM chats WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let title: String = row
                .try_get("title")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))?;
            chats.push(ChatSummary { id, title });
        }
        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::tests::test_pool;
    use crate::sqlite::user::SqliteUserRepository;
    use parley_core::repository::user::UserRepository;
    use parley_types::user::User;

    async fn seeded_user(pool: &DatabasePool) -> Uuid {
        let users = SqliteUserRepository::new(pool.clone());
        let user = User {
            id: Uuid::now_v7(),
            token_hash: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };
        users.create_user(&user).await.unwrap();
        user.id
    }

    fn chat_for(user_id: Uuid, title: &str) -> (Chat, Message) {
        let chat = Chat {
            id: Uuid::now_v7(),
            user_id,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        let system = Message {
            id: Uuid::now_v7(),
            chat_id: chat.id,
            role: MessageRole::System,
            content: "you are helpful".to_string(),
            image_refs: vec![],
            voice_refs: vec![],
            voice_transcription: None,
            created_at: chat.created_at,
        };
        (chat, system)
    }

    fn user_message(chat_id: Uuid, content: &str) -> Message {
        Message {
            id: Uuid::now_v7(),
            chat_id,
            role: MessageRole::User,
            content: content.to_string(),
            image_refs: vec!["pics/a.png".to_string()],
            voice_refs: vec![],
            voice_transcription: Some("spoken".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn chat_opens_with_its_system_message() {
        let (_dir, pool) = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let repo = SqliteChatRepository::new(pool);

        let (chat, system) = chat_for(user_id, "first");
        repo.create_chat(&chat, &system).await.unwrap();

        let messages = repo.list_messages(&chat.id, true).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::System);

        assert_eq!(repo.chat_owner(&chat.id).await.unwrap(), Some(user_id));
        assert_eq!(repo.chat_owner(&Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn projections_differ_on_system_and_transcription() {
        let (_dir, pool) = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let repo = SqliteChatRepository::new(pool);

        let (chat, system) = chat_for(user_id, "t");
        repo.create_chat(&chat, &system).await.unwrap();
        repo.append_message(&user_message(chat.id, "hello")).await.unwrap();

        let model_view = repo.list_messages(&chat.id, true).await.unwrap();
        assert_eq!(model_view.len(), 2);
        assert_eq!(model_view[1].voice_transcription.as_deref(), Some("spoken"));
        assert_eq!(model_view[1].image_refs, vec!["pics/a.png".to_string()]);

        let client_view = repo.list_messages(&chat.id, false).await.unwrap();
        assert_eq!(client_view.len(), 1);
        assert_eq!(client_view[0].role, MessageRole::User);
        assert!(client_view[0].voice_transcription.is_none());
    }

    #[tokio::test]
    async fn messages_keep_append_order() {
        let (_dir, pool) = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let repo = SqliteChatRepository::new(pool);

        let (chat, system) = chat_for(user_id, "t");
        repo.create_chat(&chat, &system).await.unwrap();
        for i in 0..5 {
            repo.append_message(&user_message(chat.id, &format!("m{i}"))).await.unwrap();
        }

        let messages = repo.list_messages(&chat.id, false).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn chat_list_is_newest_first() {
        let (_dir, pool) = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let repo = SqliteChatRepository::new(pool);

        let (older, older_sys) = chat_for(user_id, "older");
        repo.create_chat(&older, &older_sys).await.unwrap();
        let (newer, newer_sys) = chat_for(user_id, "newer");
        repo.create_chat(&newer, &newer_sys).await.unwrap();

        let list = repo.list_chats_for_user(&user_id).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "newer");
        assert_eq!(list[1].title, "older");
    }
}
