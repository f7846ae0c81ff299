//! Chat and message types for Parley.
//!
//! A chat is an append-only ordered message log owned by exactly one user.
//! The first message of every chat is a system message, written in the same
//! transaction as the chat row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Role of a message within a chat.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('system', 'user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A chat owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Listing projection of a chat: `{id, title}`, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: String,
}

/// A single message within a chat.
///
/// Messages are immutable once written and totally ordered by
/// `(created_at, id)` within a chat -- ids are UUIDv7 and time-sortable,
/// which breaks same-millisecond ties deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// Opaque storage paths of images attached to this message.
    #[serde(default)]
    pub image_refs: Vec<String>,
    /// Opaque storage paths of voice recordings attached to this message.
    #[serde(default)]
    pub voice_refs: Vec<String>,
    /// Cached transcription of the attached voice recordings. Only present
    /// on the model projection of the history; never sent to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_transcription: Option<String>,
    pub created_at: DateTime<Utc>,
}
