//! BillingClient trait definition.

use parley_types::billing::Purchase;
use parley_types::error::BillingError;

/// Client for the subscription-billing provider's REST surface.
///
/// The reconciler trusts only the subject user id from webhook events and
/// re-fetches authoritative purchase state through this trait.
pub trait BillingClient: Send + Sync {
    /// All non-subscription purchase line items for a subject user.
    fn non_subscription_purchases(
        &self,
        app_user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Purchase>, BillingError>> + Send;
}
