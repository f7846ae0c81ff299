//! Billing-provider types.
//!
//! Events carry only a subject user id and a type tag; the reconciler
//! re-fetches authoritative purchase state from the provider rather than
//! trusting any further payload fields.

use serde::{Deserialize, Serialize};

/// An inbound billing event, as delivered by the provider's webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingEvent {
    /// The user the event is about. This is the only payload field acted on.
    pub app_user_id: String,
    /// Provider event type tag (e.g. "NON_RENEWING_PURCHASE"). Logged only.
    #[serde(rename = "type", default)]
    pub event_type: String,
}

/// A non-subscription purchase line item fetched from the billing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Provider transaction id -- the idempotency key.
    #[serde(rename = "id")]
    pub transaction_id: String,
    /// Store product identifier, mapped to a credit count via the static
    /// product table.
    pub product_id: String,
    #[serde(default)]
    pub purchase_date: Option<String>,
}
