//! Axum router configuration for withdrawal endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{
    gateway_notification, get_withdrawal, list_withdrawals, reconcile_withdrawal,
    submit_withdrawal,
};

/// Create the withdrawal API router.
///
/// # Routes
///
/// ## Authenticated endpoints
/// - `POST /` - Submit a withdrawal for a task
/// - `GET /` - List withdrawals (admin; `?stale=true` for reconciliation candidates)
/// - `GET /:id` - Current state of a withdrawal
/// - `POST /:id/reconcile` - Settle from gateway ground truth (admin)
pub fn withdrawal_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_withdrawal).get(list_withdrawals))
        .route("/:id", get(get_withdrawal))
        .route("/:id/reconcile", post(reconcile_withdrawal))
}

/// Create the gateway notification router.
///
/// Separate from the authenticated routes: notifications carry their own
/// RSA signature instead of caller credentials.
///
/// # Routes
/// - `POST /gateway` - Inbound gateway outcome notification
pub fn notification_routes() -> Router<AppState> {
    Router::new().route("/gateway", post(gateway_notification))
}
