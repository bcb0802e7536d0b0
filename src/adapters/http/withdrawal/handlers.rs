//! HTTP handlers for withdrawal endpoints.
//!
//! The notification endpoint speaks the gateway's acknowledgement protocol:
//! a literal body token decides whether the gateway stops retrying. Permanent
//! rejections acknowledge (after logging) so a notification this system will
//! never accept cannot retry forever; only transient internal failures answer
//! the retry-triggering token.

use axum::extract::{Path, Query, RawForm, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::handlers::withdrawal::{
    GatewayNotificationCommand, GetWithdrawalQuery, ListWithdrawalsQuery,
    ReconcileWithdrawalCommand, SubmitWithdrawalCommand,
};
use crate::domain::foundation::{TaskId, WithdrawId};

use super::super::error::ApiError;
use super::super::state::{AppState, AuthenticatedCaller};
use super::dto::{
    ListWithdrawalsParams, ReconcileResponse, SubmitWithdrawalRequest, WithdrawalSubmittedResponse,
    WithdrawalViewResponse,
};

/// Acknowledgement token that stops gateway redelivery.
pub const ACK_SUCCESS: &str = "success";
/// Acknowledgement token that triggers gateway redelivery.
pub const ACK_RETRY: &str = "failure";

/// POST /api/withdrawals - Submit a withdrawal for a task
pub async fn submit_withdrawal(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<SubmitWithdrawalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.submit_handler();
    let cmd = SubmitWithdrawalCommand {
        caller,
        task_id: TaskId::new(request.task_id),
        amount: request.amount,
        account_type: request.account_type,
        account_info: request.account_info,
    };

    let result = handler.handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(WithdrawalSubmittedResponse::from(result)),
    ))
}

/// GET /api/withdrawals/:id - Current state of a withdrawal
pub async fn get_withdrawal(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<WithdrawId>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.get_withdrawal_handler();
    let record = handler
        .handle(GetWithdrawalQuery {
            caller,
            withdraw_id: id,
        })
        .await?;

    Ok(Json(WithdrawalViewResponse::from(record)))
}

/// GET /api/withdrawals - Admin listing; `?stale=true` filters to stale
/// processing records awaiting reconciliation
pub async fn list_withdrawals(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Query(params): Query<ListWithdrawalsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_withdrawals_handler();
    let records = handler
        .handle(ListWithdrawalsQuery {
            caller,
            stale_only: params.stale,
            stale_after_minutes: state.stale_after_minutes,
        })
        .await?;

    let views: Vec<WithdrawalViewResponse> =
        records.into_iter().map(WithdrawalViewResponse::from).collect();
    Ok(Json(views))
}

/// POST /api/withdrawals/:id/reconcile - Settle a stale withdrawal from
/// gateway ground truth
pub async fn reconcile_withdrawal(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<WithdrawId>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.reconcile_handler();
    let outcome = handler
        .handle(ReconcileWithdrawalCommand {
            caller,
            withdraw_id: id,
        })
        .await?;

    Ok(Json(ReconcileResponse::from(outcome)))
}

/// POST /api/notifications/gateway - Inbound gateway outcome notification
///
/// No caller authentication: the notification authenticates itself via its
/// RSA signature. The response body is the literal acknowledgement token.
pub async fn gateway_notification(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Response {
    let fields: Vec<(String, String)> = match serde_urlencoded::from_bytes(&body) {
        Ok(fields) => fields,
        Err(e) => {
            // Undecodable on this delivery means undecodable on every retry.
            tracing::error!(error = %e, "gateway notification body is not form-encoded");
            return (StatusCode::OK, ACK_SUCCESS).into_response();
        }
    };

    let handler = state.notification_handler();
    match handler.handle(GatewayNotificationCommand { fields }).await {
        Ok(_) => (StatusCode::OK, ACK_SUCCESS).into_response(),
        Err(e) => {
            tracing::error!(
                error = %e,
                "gateway notification processing failed transiently; requesting redelivery"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, ACK_RETRY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_tokens_are_distinct_literals() {
        assert_eq!(ACK_SUCCESS, "success");
        assert_eq!(ACK_RETRY, "failure");
        assert_ne!(ACK_SUCCESS, ACK_RETRY);
    }
}
