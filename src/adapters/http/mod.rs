//! HTTP adapter: axum routers, DTOs, and error mapping.

pub mod error;
pub mod points;
pub mod state;
pub mod withdrawal;

use axum::routing::get;
use axum::Router;

pub use error::{ApiError, ErrorResponse};
pub use state::{AppState, AuthenticatedCaller};

/// Assembles the full application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/withdrawals", withdrawal::withdrawal_routes())
        .nest("/api/notifications", withdrawal::notification_routes())
        .nest("/api/points", points::points_routes())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
