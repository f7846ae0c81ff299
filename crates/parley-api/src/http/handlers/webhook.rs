//! Billing webhook handler.
//!
//! Verifies the provider's bearer token, acknowledges immediately so the
//! billing provider is never blocked on internal processing, and runs
//! reconciliation on a detached background task. Redelivery of the same
//! event is harmless: idempotency lives in the processed-transaction
//! barrier, not here.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;

use parley_types::billing::BillingEvent;

use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct WebhookBody {
    event: BillingEvent,
}

/// POST /api/v1/webhooks/billing - Receive a billing-provider event.
pub async fn receive_billing_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let expected = format!("Bearer {}", state.webhook_token.expose_secret());
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|auth| auth == expected);
    if !authorized {
        tracing::warn!("unauthorized billing webhook attempt");
        return Err(ApiError::Unauthorized("invalid webhook token".to_string()));
    }

    // Acknowledge before processing; reconciliation happens on a detached
    // task and its failures are logged, never surfaced to the provider.
    let reconciler = Arc::clone(&state.reconciler);
    tokio::spawn(async move {
        let event = match serde_json::from_slice::<WebhookBody>(&body) {
            Ok(parsed) => parsed.event,
            Err(err) => {
                tracing::warn!(error = %err, "invalid billing webhook payload");
                return;
            }
        };

        match reconciler.reconcile(&event).await {
            Ok(summary) => {
                tracing::info!(
                    app_user_id = %event.app_user_id,
                    credited = summary.credited,
                    already_processed = summary.already_processed,
                    unknown_products = summary.unknown_products,
                    "billing event reconciled"
                );
            }
            Err(err) => {
                tracing::error!(
                    app_user_id = %event.app_user_id,
                    error = %err,
                    "billing event reconciliation failed"
                );
            }
        }
    });

    Ok(StatusCode::OK)
}
