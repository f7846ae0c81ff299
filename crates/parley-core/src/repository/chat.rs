//! ChatRepository trait definition.
//!
//! The message log is append-only: nothing here updates or deletes a
//! message row once written.

use parley_types::chat::{Chat, ChatSummary, Message};
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat and message persistence.
///
/// Implementations live in parley-infra (e.g. `SqliteChatRepository`).
pub trait ChatRepository: Send + Sync {
    /// Create a chat together with its opening system message.
    ///
    /// The two inserts must land atomically: no chat row may ever be
    /// observable without its system message.
    fn create_chat(
        &self,
        chat: &Chat,
        system_message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Owner of a chat, or `None` when the chat does not exist.
    fn chat_owner(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Uuid>, RepositoryError>> + Send;

    /// Append one message to a chat's log.
    fn append_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Messages of a chat, ascending by creation time.
    ///
    /// `include_system = false` is the client projection: system messages
    /// are excluded and cached voice transcriptions are stripped.
    /// `include_system = true` is the model projection with transcriptions
    /// attached.
    fn list_messages(
        &self,
        chat_id: &Uuid,
        include_system: bool,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// `{id, title}` summaries of a user's chats, newest first.
    fn list_chats_for_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSummary>, RepositoryError>> + Send;
}

/// In-memory fake for unit tests across the crate.
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::{Arc, Mutex};

    use parley_types::chat::{Chat, ChatSummary, Message, MessageRole};
    use parley_types::error::RepositoryError;
    use uuid::Uuid;

    use super::ChatRepository;

    /// Clones share state, so a test can keep a handle while a service owns
    /// another.
    #[derive(Clone, Default)]
    pub struct FakeChatRepository {
        chats: Arc<Mutex<Vec<Chat>>>,
        messages: Arc<Mutex<Vec<Message>>>,
    }

    impl FakeChatRepository {
        pub fn chat_count(&self) -> usize {
            self.chats.lock().unwrap().len()
        }

        /// All messages of a chat in append order, system included.
        pub fn log(&self, chat_id: &Uuid) -> Vec<Message> {
            let mut msgs: Vec<Message> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.chat_id == *chat_id)
                .cloned()
                .collect();
            msgs.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
            msgs
        }
    }

    impl ChatRepository for FakeChatRepository {
        async fn create_chat(
            &self,
            chat: &Chat,
            system_message: &Message,
        ) -> Result<(), RepositoryError> {
            self.chats.lock().unwrap().push(chat.clone());
            self.messages.lock().unwrap().push(system_message.clone());
            Ok(())
        }

        async fn chat_owner(&self, chat_id: &Uuid) -> Result<Option<Uuid>, RepositoryError> {
            Ok(self
                .chats
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == *chat_id)
                .map(|c| c.user_id))
        }

        async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn list_messages(
            &self,
            chat_id: &Uuid,
            include_system: bool,
        ) -> Result<Vec<Message>, RepositoryError> {
            let mut msgs: Vec<Message> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.chat_id == *chat_id)
                .filter(|m| include_system || m.role != MessageRole::System)
                .cloned()
                .collect();
            msgs.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
            if !include_system {
                for msg in &mut msgs {
                    msg.voice_transcription = None;
                }
            }
            Ok(msgs)
        }

        async fn list_chats_for_user(
            &self,
            user_id: &Uuid,
        ) -> Result<Vec<ChatSummary>, RepositoryError> {
            let mut chats: Vec<Chat> = self
                .chats
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.user_id == *user_id)
                .cloned()
                .collect();
            chats.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Ok(chats
                .into_iter()
                .map(|c| ChatSummary { id: c.id, title: c.title })
                .collect())
        }
    }
}
