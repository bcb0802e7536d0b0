//! Axum router configuration for point ledger endpoints.

use axum::routing::post;
use axum::Router;

use super::super::state::AppState;
use super::handlers::adjust_points;

/// Create the points API router.
///
/// # Routes
/// - `POST /adjust` - Admin balance adjustment (audited via the ledger)
pub fn points_routes() -> Router<AppState> {
    Router::new().route("/adjust", post(adjust_points))
}
