//! Application state wiring all services together.
//!
//! Services are generic over repository/capability traits; AppState pins
//! them to the concrete infra implementations. The store-capability handle
//! is injected at construction -- no component reaches a global singleton.

use std::path::Path;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use parley_core::billing::PurchaseReconciler;
use parley_core::chat::ConversationService;
use parley_core::entitlement::EntitlementService;
use parley_core::turn::TurnEngine;
use parley_infra::billing::RevenueCatClient;
use parley_infra::config::AppConfig;
use parley_infra::openai::{OpenAiModel, OpenAiTranscriber};
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::ledger::SqliteLedgerRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::user::SqliteUserRepository;
use parley_infra::storage::{HttpMediaFetcher, SupabaseSigner};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteConversationService = ConversationService<SqliteChatRepository>;

pub type ConcreteEntitlementService = EntitlementService<SqliteLedgerRepository>;

pub type ConcreteTurnEngine = TurnEngine<
    SqliteChatRepository,
    SqliteLedgerRepository,
    SupabaseSigner,
    HttpMediaFetcher,
    OpenAiTranscriber,
    OpenAiModel,
>;

pub type ConcreteReconciler = PurchaseReconciler<SqliteLedgerRepository, RevenueCatClient>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<SqliteUserRepository>,
    pub chats: Arc<ConcreteConversationService>,
    pub entitlements: Arc<ConcreteEntitlementService>,
    pub engine: Arc<ConcreteTurnEngine>,
    pub reconciler: Arc<ConcreteReconciler>,
    pub webhook_token: Arc<SecretString>,
    pub db_pool: DatabasePool,
}

/// Duplicate a secret for a second consumer without leaving an exposed copy
/// around.
fn dup_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

impl AppState {
    /// Initialize the application state: connect to the DB, wire services.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database_url).await?;

        let system_prompt =
            parley_infra::config::load_system_prompt(config.system_prompt_path.as_deref().map(Path::new))
                .await;

        // Capability adapters. The turn engine owns one signer; a second one
        // could be handed to other consumers the same way if needed.
        let signer = SupabaseSigner::new(
            &config.supabase_url,
            config.supabase_service_role,
            config.image_bucket,
            config.voice_bucket,
            config.signed_url_ttl_secs,
        );
        let model = OpenAiModel::new(dup_secret(&config.openai_api_key));
        let transcriber = OpenAiTranscriber::new(config.openai_api_key);
        let billing = RevenueCatClient::new(config.revenuecat_api_key);

        // The engine owns its own service instances over cloned pool handles;
        // the handler-facing services below are separate instances over the
        // same store.
        let engine = TurnEngine::new(
            ConversationService::new(SqliteChatRepository::new(db_pool.clone())),
            EntitlementService::new(SqliteLedgerRepository::new(db_pool.clone())),
            signer,
            HttpMediaFetcher::new(),
            transcriber,
            model,
            config.model_id,
            system_prompt,
        );

        let reconciler = PurchaseReconciler::new(
            EntitlementService::new(SqliteLedgerRepository::new(db_pool.clone())),
            billing,
        );

        Ok(Self {
            users: Arc::new(SqliteUserRepository::new(db_pool.clone())),
            chats: Arc::new(ConversationService::new(SqliteChatRepository::new(db_pool.clone()))),
            entitlements: Arc::new(EntitlementService::new(SqliteLedgerRepository::new(
                db_pool.clone(),
            ))),
            engine: Arc::new(engine),
            reconciler: Arc::new(reconciler),
            webhook_token: Arc::new(config.webhook_token),
            db_pool,
        })
    }
}
