//! UserRepository trait definition.

use parley_types::error::RepositoryError;
use parley_types::user::User;
use uuid::Uuid;

/// Repository trait for user identity persistence.
pub trait UserRepository: Send + Sync {
    /// Persist a freshly signed-up user.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve a bearer-token hash to a user id, if any user owns it.
    fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<Uuid>, RepositoryError>> + Send;
}
