//! RevenueCatClient -- concrete [`BillingClient`] over the RevenueCat
//! subscribers API.
//!
//! The reconciler never trusts webhook payloads beyond the subject user id;
//! this client re-fetches the authoritative purchase state.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use parley_core::billing::BillingClient;
use parley_types::billing::Purchase;
use parley_types::error::BillingError;

/// RevenueCat REST client.
pub struct RevenueCatClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SubscriberResponse {
    subscriber: Subscriber,
}

#[derive(Debug, Deserialize)]
struct Subscriber {
    /// Product id -> purchase line items.
    #[serde(default)]
    non_subscriptions: HashMap<String, Vec<LineItem>>,
}

#[derive(Debug, Deserialize)]
struct LineItem {
    id: String,
    #[serde(default)]
    purchase_date: Option<String>,
}

/// Flatten the provider's product-keyed map into purchase line items.
fn flatten(subscriber: Subscriber) -> Vec<Purchase> {
    subscriber
        .non_subscriptions
        .into_iter()
        .flat_map(|(product_id, items)| {
            items.into_iter().map(move |item| Purchase {
                transaction_id: item.id,
                product_id: product_id.clone(),
                purchase_date: item.purchase_date,
            })
        })
        .collect()
}

impl RevenueCatClient {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.revenuecat.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl BillingClient for RevenueCatClient {
    async fn non_subscription_purchases(
        &self,
        app_user_id: &str,
    ) -> Result<Vec<Purchase>, BillingError> {
        let url = format!("{}/v1/subscribers/{app_user_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BillingError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BillingError::Api { status: status.as_u16() });
        }

        let body: SubscriberResponse = response
            .json()
            .await
            .map_err(|e| BillingError::Deserialization(e.to_string()))?;

        Ok(flatten(body.subscriber))
    }
}
