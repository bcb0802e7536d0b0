//! Shared application state and the authenticated-caller extractor.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::points::AdjustPointsHandler;
use crate::application::handlers::withdrawal::{
    GetWithdrawalHandler, HandleGatewayNotificationHandler, ListWithdrawalsHandler,
    ReconcileWithdrawalHandler, SettlementService, SubmitWithdrawalHandler,
};
use crate::domain::foundation::AuthContext;
use crate::domain::withdrawal::SignatureVerifier;
use crate::ports::{AuthVerifier, PaymentGateway, PointLedger, TaskRepository, WithdrawalRepository};

use super::error::ErrorResponse;

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskRepository>,
    pub withdrawals: Arc<dyn WithdrawalRepository>,
    pub ledger: Arc<dyn PointLedger>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub auth_verifier: Arc<dyn AuthVerifier>,
    pub signature_verifier: Arc<SignatureVerifier>,
    /// Minutes after which a processing withdrawal counts as stale.
    pub stale_after_minutes: i64,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn settlement_service(&self) -> SettlementService {
        SettlementService::new(self.withdrawals.clone(), self.tasks.clone(), self.ledger.clone())
    }

    pub fn submit_handler(&self) -> SubmitWithdrawalHandler {
        SubmitWithdrawalHandler::new(
            self.tasks.clone(),
            self.withdrawals.clone(),
            self.gateway.clone(),
        )
    }

    pub fn notification_handler(&self) -> HandleGatewayNotificationHandler {
        HandleGatewayNotificationHandler::new(
            self.signature_verifier.clone(),
            self.settlement_service(),
        )
    }

    pub fn reconcile_handler(&self) -> ReconcileWithdrawalHandler {
        ReconcileWithdrawalHandler::new(
            self.withdrawals.clone(),
            self.gateway.clone(),
            self.settlement_service(),
        )
    }

    pub fn get_withdrawal_handler(&self) -> GetWithdrawalHandler {
        GetWithdrawalHandler::new(self.withdrawals.clone())
    }

    pub fn list_withdrawals_handler(&self) -> ListWithdrawalsHandler {
        ListWithdrawalsHandler::new(self.withdrawals.clone())
    }

    pub fn adjust_points_handler(&self) -> AdjustPointsHandler {
        AdjustPointsHandler::new(self.ledger.clone())
    }
}

/// Authenticated caller extracted from the Authorization header via the
/// injected `AuthVerifier`.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub AuthContext);

/// Rejection type for AuthenticatedCaller extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
            .ok_or(AuthenticationRequired)?;

        let context = state
            .auth_verifier
            .verify(credentials)
            .await
            .map_err(|_| AuthenticationRequired)?;

        Ok(AuthenticatedCaller(context))
    }
}
