//! HTTP handlers for point ledger endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::points::AdjustPointsCommand;
use crate::domain::foundation::UserId;

use super::super::error::ApiError;
use super::super::state::{AppState, AuthenticatedCaller};
use super::dto::{AdjustPointsRequest, LedgerEntryResponse};

/// POST /api/points/adjust - Admin balance adjustment through the ledger
pub async fn adjust_points(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<AdjustPointsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.adjust_points_handler();
    let entry = handler
        .handle(AdjustPointsCommand {
            caller,
            user_id: UserId::new(request.user_id),
            delta: request.delta,
            reason: request.reason,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(LedgerEntryResponse::from(entry))))
}
