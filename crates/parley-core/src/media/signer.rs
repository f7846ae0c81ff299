//! Storage URL-signing capability.

use parley_types::error::MediaError;

/// The two storage buckets assets live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Voice,
}

/// Resolves an opaque storage path to a short-lived fetchable URL.
///
/// Signing is treated as a pure, cheap, idempotent external call; history
/// images are re-signed on every turn rather than cached.
pub trait UrlSigner: Send + Sync {
    fn signed_url(
        &self,
        kind: AssetKind,
        path: &str,
    ) -> impl std::future::Future<Output = Result<String, MediaError>> + Send;
}
