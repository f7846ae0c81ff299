//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Identity
        .route("/signup", post(handlers::identity::sign_up))
        .route("/launch", get(handlers::identity::launch))
        // Conversation
        .route("/chat", post(handlers::chat::post_turn))
        .route("/chat/{id}/messages", get(handlers::chat::get_history))
        .route("/chats", get(handlers::chats::list_chats))
        // Billing
        .route(
            "/purchases/{transaction_id}/confirmation",
            get(handlers::confirmation::confirm_purchase),
        )
        .route("/webhooks/billing", post(handlers::webhook::receive_billing_event));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
