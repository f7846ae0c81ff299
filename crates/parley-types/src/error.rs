use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from the entitlement gate.
///
/// `Exhausted` and `MediaRequiresPaid` are user-actionable, not server
/// faults; the API layer surfaces them with a 4xx status.
#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("no entitlement ledger for user")]
    NotFound,

    #[error("no messages left on any balance")]
    Exhausted,

    #[error("image and voice attachments require a paid message balance")]
    MediaRequiresPaid,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from media capabilities: URL signing, audio fetch, transcription.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to sign storage url for '{path}': {message}")]
    Resolve { path: String, message: String },

    #[error("failed to fetch media: {0}")]
    Fetch(String),

    #[error("transcription failed: {0}")]
    Transcription(String),
}

/// Errors from the billing-provider client.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("billing request failed: {0}")]
    Http(String),

    #[error("billing provider returned HTTP {status}")]
    Api { status: u16 },

    #[error("failed to decode billing response: {0}")]
    Deserialization(String),
}

/// Errors from the model inference capability.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(String),

    #[error("model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no choices")]
    EmptyCompletion,

    #[error("failed to decode model response: {0}")]
    Deserialization(String),
}

/// Everything that can abort a conversation turn.
///
/// Each variant carries a stable machine-readable kind (`kind()`) alongside
/// the human-readable Display message; the pair is the wire error format.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("chat not found")]
    ChatNotFound,

    #[error("chat belongs to a different user")]
    Forbidden,

    #[error("no messages left on any balance")]
    Exhausted,

    #[error("image and voice attachments require a paid message balance")]
    MediaRequiresPaid,

    #[error("failed to resolve attachment: {0}")]
    UpstreamResolution(String),

    #[error("voice transcription failed: {0}")]
    Transcription(String),

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] RepositoryError),
}

impl TurnError {
    /// Stable machine-readable error kind for the wire format.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::ChatNotFound => "not_found",
            TurnError::Forbidden => "forbidden",
            TurnError::Exhausted => "no_messages_left",
            TurnError::MediaRequiresPaid => "media_requires_paid",
            TurnError::UpstreamResolution(_) => "upstream_resolution_error",
            TurnError::Transcription(_) => "voice_transcription_error",
            TurnError::Model(_) => "model_error",
            TurnError::Persistence(_) => "persistence_error",
        }
    }

    /// Whether the failure is the caller's to fix rather than a server fault.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            TurnError::ChatNotFound
                | TurnError::Forbidden
                | TurnError::Exhausted
                | TurnError::MediaRequiresPaid
        )
    }
}

impl From<EntitlementError> for TurnError {
    fn from(e: EntitlementError) -> Self {
        match e {
            EntitlementError::NotFound => TurnError::Persistence(RepositoryError::NotFound),
            EntitlementError::Exhausted => TurnError::Exhausted,
            EntitlementError::MediaRequiresPaid => TurnError::MediaRequiresPaid,
            EntitlementError::Storage(e) => TurnError::Persistence(e),
        }
    }
}
