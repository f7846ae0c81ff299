//! The entitlement-gated turn engine.
//!
//! One strictly sequential pipeline per inbound turn, no retries:
//!
//! gate-check -> chat-resolved -> media-checked -> voice-transcribed ->
//! user-turn-persisted -> assembled -> model-called ->
//! assistant-turn-persisted -> debited -> done.
//!
//! Each step produces a typed value or a typed [`TurnError`] that aborts
//! the turn. The balance snapshot read at gate time governs the whole turn,
//! including which balance the final debit comes from; persistence starts
//! only after every check has passed, so a rejected turn leaves no rows.

use parley_types::entitlement::BalanceKind;
use parley_types::chat::{Message, MessageRole};
use parley_types::error::TurnError;
use parley_types::model::{ModelMessage, ModelRequest};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::{ChatPlan, ConversationService};
use crate::entitlement::EntitlementService;
use crate::media::signer::UrlSigner;
use crate::media::transcriber::{MediaFetcher, Transcriber};
use crate::media::voice::transcribe_voice_refs;
use crate::model::ModelProvider;
use crate::repository::chat::ChatRepository;
use crate::repository::ledger::LedgerRepository;
use crate::turn::assembler;

/// One inbound client turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Target chat; `None` starts a new chat titled from the prompt.
    pub chat_id: Option<Uuid>,
    pub prompt: String,
    pub image_refs: Vec<String>,
    pub voice_refs: Vec<String>,
}

/// A completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub chat_id: Uuid,
    pub response: String,
}

/// Sequences one turn end to end.
///
/// Generic over the repository and capability traits so the pipeline is
/// unit-testable against in-memory fakes, in the same spirit as the other
/// core services.
pub struct TurnEngine<C, L, S, F, T, M>
where
    C: ChatRepository,
    L: LedgerRepository,
    S: UrlSigner,
    F: MediaFetcher,
    T: Transcriber,
    M: ModelProvider,
{
    chats: ConversationService<C>,
    entitlements: EntitlementService<L>,
    signer: S,
    fetcher: F,
    transcriber: T,
    model: M,
    model_id: String,
    system_prompt: String,
}

impl<C, L, S, F, T, M> TurnEngine<C, L, S, F, T, M>
where
    C: ChatRepository,
    L: LedgerRepository,
    S: UrlSigner,
    F: MediaFetcher,
    T: Transcriber,
    M: ModelProvider,
{
    pub fn new(
        chats: ConversationService<C>,
        entitlements: EntitlementService<L>,
        signer: S,
        fetcher: F,
        transcriber: T,
        model: M,
        model_id: String,
        system_prompt: String,
    ) -> Self {
        Self {
            chats,
            entitlements,
            signer,
            fetcher,
            transcriber,
            model,
            model_id,
            system_prompt,
        }
    }

    /// Run one turn for `user_id`.
    #[tracing::instrument(name = "turn", skip(self, request), fields(user_id = %user_id))]
    pub async fn run(&self, user_id: Uuid, request: TurnRequest) -> Result<TurnOutcome, TurnError> {
        // gate-check: one snapshot governs the whole turn.
        let snapshot = self.entitlements.check_and_classify(&user_id).await?;

        // chat-resolved: ownership verified, or a creation planned. No writes yet.
        let plan = self
            .chats
            .plan_turn(&user_id, request.chat_id, &request.prompt)
            .await?;

        // media-checked, against the gate-time snapshot.
        self.entitlements.require_media_allowed(
            &snapshot,
            !request.image_refs.is_empty(),
            !request.voice_refs.is_empty(),
        )?;

        // voice-transcribed (optional): once, synchronously, before assembly.
        let transcript =
            transcribe_voice_refs(&self.signer, &self.fetcher, &self.transcriber, &request.voice_refs)
                .await
                .map_err(|e| TurnError::Transcription(e.to_string()))?;

        // user-turn-persisted. The create branch materializes here, so every
        // earlier rejection left no trace.
        let chat_id = match plan {
            ChatPlan::Existing(id) => id,
            ChatPlan::Create { title } => {
                self.chats
                    .create_chat(&user_id, title, &self.system_prompt)
                    .await?
                    .id
            }
        };
        let user_message = self
            .chats
            .append_user_message(
                chat_id,
                request.prompt.clone(),
                request.image_refs.clone(),
                request.voice_refs.clone(),
                transcript.clone(),
            )
            .await?;

        // assembled: model projection of the history, minus the turn we just
        // wrote (its prompt, images, and transcript are appended once by the
        // assembler).
        let mut history = self.chats.history(&chat_id, true).await?;
        history.retain(|m: &Message| m.id != user_message.id);
        let parts = assembler::assemble(
            &self.signer,
            &history,
            &request.prompt,
            &request.image_refs,
            transcript.as_deref(),
        )
        .await?;

        // model-called. From here on the user message stays persisted even on
        // failure, so the conversation is resumable; the debit only happens
        // after the assistant turn lands.
        let model_request = ModelRequest {
            model: self.model_id.clone(),
            messages: vec![ModelMessage { role: MessageRole::User, content: parts }],
        };
        let completion = match self.model.complete(&model_request).await {
            Ok(completion) => completion,
            Err(err) => {
                warn!(chat_id = %chat_id, error = %err, "model call failed, turn aborted after user persist");
                return Err(err.into());
            }
        };

        // assistant-turn-persisted.
        self.chats
            .append_assistant_message(chat_id, completion.content.clone())
            .await?;

        // debited: paid preferred over free, per the gate-time snapshot.
        let used_paid = snapshot.debit_kind() == BalanceKind::Paid;
        self.entitlements.debit_one_message(&user_id, used_paid).await?;

        info!(chat_id = %chat_id, used_paid, "turn completed");
        Ok(TurnOutcome { chat_id, response: completion.content })
    }
}
