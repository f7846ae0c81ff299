//! ModelProvider trait definition.
//!
//! The turn engine only ever needs the best completion for an assembled
//! request; streaming is deliberately out of scope.

use parley_types::error::ModelError;
use parley_types::model::{Completion, ModelRequest};

/// Trait for vision-capable inference backends.
///
/// Implementations live in parley-infra (e.g. `OpenAiModel`). Uses native
/// async fn in traits (RPITIT, Rust 2024 edition).
pub trait ModelProvider: Send + Sync {
    /// Send a request and return the best completion.
    ///
    /// An empty choice list is a failure (`ModelError::EmptyCompletion`),
    /// not an empty success.
    fn complete(
        &self,
        request: &ModelRequest,
    ) -> impl std::future::Future<Output = Result<Completion, ModelError>> + Send;
}
