//! Conversation service over the append-only message log.
//!
//! Handles chat resolution for a turn (create vs. verify-ownership),
//! message appends, and the two history projections.

use chrono::Utc;
use parley_types::chat::{Chat, ChatSummary, Message, MessageRole};
use parley_types::error::{RepositoryError, TurnError};
use tracing::info;
use uuid::Uuid;

use crate::chat::title::derive_title;
use crate::repository::chat::ChatRepository;

/// Where a turn's messages will land: an existing, ownership-verified chat,
/// or a chat yet to be created.
///
/// Resolution performs no writes; the create branch materializes only at
/// persist time, so a turn rejected after resolution leaves no trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatPlan {
    Existing(Uuid),
    Create { title: String },
}

/// Service over [`ChatRepository`].
///
/// Generic over the repository trait so core logic stays testable against
/// an in-memory fake (parley-core never depends on parley-infra).
pub struct ConversationService<C: ChatRepository> {
    chats: C,
}

impl<C: ChatRepository> ConversationService<C> {
    pub fn new(chats: C) -> Self {
        Self { chats }
    }

    /// Resolve the target chat for a turn.
    ///
    /// No chat id: plan a new chat titled from the prompt. With a chat id:
    /// verify it exists and belongs to the requester.
    pub async fn plan_turn(
        &self,
        user_id: &Uuid,
        chat_id: Option<Uuid>,
        prompt: &str,
    ) -> Result<ChatPlan, TurnError> {
        match chat_id {
            None => Ok(ChatPlan::Create { title: derive_title(prompt) }),
            Some(id) => match self.chats.chat_owner(&id).await? {
                None => Err(TurnError::ChatNotFound),
                Some(owner) if owner != *user_id => Err(TurnError::Forbidden),
                Some(_) => Ok(ChatPlan::Existing(id)),
            },
        }
    }

    /// Create a chat with its opening system message (one atomic write).
    pub async fn create_chat(
        &self,
        user_id: &Uuid,
        title: String,
        system_prompt: &str,
    ) -> Result<Chat, RepositoryError> {
        let chat = Chat {
            id: Uuid::now_v7(),
            user_id: *user_id,
            title,
            created_at: Utc::now(),
        };
        let system_message = Message {
            id: Uuid::now_v7(),
            chat_id: chat.id,
            role: MessageRole::System,
            content: system_prompt.to_string(),
            image_refs: Vec::new(),
            voice_refs: Vec::new(),
            voice_transcription: None,
            created_at: chat.created_at,
        };
        self.chats.create_chat(&chat, &system_message).await?;
        info!(chat_id = %chat.id, user_id = %user_id, "chat created");
        Ok(chat)
    }

    /// Append the user's turn, with its media refs and cached transcription.
    pub async fn append_user_message(
        &self,
        chat_id: Uuid,
        content: String,
        image_refs: Vec<String>,
        voice_refs: Vec<String>,
        voice_transcription: Option<String>,
    ) -> Result<Message, RepositoryError> {
        let message = Message {
            id: Uuid::now_v7(),
            chat_id,
            role: MessageRole::User,
            content,
            image_refs,
            voice_refs,
            voice_transcription,
            created_at: Utc::now(),
        };
        self.chats.append_message(&message).await?;
        Ok(message)
    }

    /// Append the assistant's reply.
    pub async fn append_assistant_message(
        &self,
        chat_id: Uuid,
        content: String,
    ) -> Result<Message, RepositoryError> {
        let message = Message {
            id: Uuid::now_v7(),
            chat_id,
            role: MessageRole::Assistant,
            content,
            image_refs: Vec::new(),
            voice_refs: Vec::new(),
            voice_transcription: None,
            created_at: Utc::now(),
        };
        self.chats.append_message(&message).await?;
        Ok(message)
    }

    /// Raw history projection; see [`ChatRepository::list_messages`].
    pub async fn history(
        &self,
        chat_id: &Uuid,
        include_system: bool,
    ) -> Result<Vec<Message>, RepositoryError> {
        self.chats.list_messages(chat_id, include_system).await
    }

    /// Ownership-checked client projection of a chat's history.
    ///
    /// Excludes the system message; cached transcriptions are never exposed
    /// to clients.
    pub async fn history_for_user(
        &self,
        user_id: &Uuid,
        chat_id: &Uuid,
    ) -> Result<Vec<Message>, TurnError> {
        match self.chats.chat_owner(chat_id).await? {
            None => Err(TurnError::ChatNotFound),
            Some(owner) if owner != *user_id => Err(TurnError::Forbidden),
            Some(_) => Ok(self.chats.list_messages(chat_id, false).await?),
        }
    }

    /// `{id, title}` of the user's chats, newest first.
    pub async fn list_chats(&self, user_id: &Uuid) -> Result<Vec<ChatSummary>, RepositoryError> {
        self.chats.list_chats_for_user(user_id).await
    }
}
