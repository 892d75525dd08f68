//! Router assembly.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{checkout, health, webhook};
use crate::state::AppState;

/// Build the application router.
///
/// The webhook route takes the raw request body so signature verification
/// runs over the exact bytes the gateway signed.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/webhooks/razorpay", post(webhook::payment_webhook))
        .route("/api/payments/confirm", post(checkout::confirm_payment))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
