//! Payment gateway port.
//!
//! The gateway performs the actual money transfer and reports the outcome
//! asynchronously; this port covers the synchronous half (submission and
//! ground-truth queries). Submission is an irreversible external side effect
//! and deliberately sits outside any database transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::withdrawal::WithdrawalError;

/// Port for the external disbursement gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a transfer. Returns the gateway's order id and computed fee.
    async fn submit_transfer(&self, request: TransferRequest)
        -> Result<TransferReceipt, GatewayError>;

    /// Queries the gateway for the ground-truth state of a transfer,
    /// identified by our business reference.
    async fn query_transfer(&self, reference: &str) -> Result<TransferState, GatewayError>;
}

/// A validated disbursement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Our business reference (`WITHDRAW_<taskId>_<suffix>`).
    pub reference: String,
    pub amount: Decimal,
    pub account_type: String,
    pub account_info: String,
}

/// Gateway response to an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// The gateway's order identifier.
    pub gateway_order_id: String,
    /// Fee the gateway charges for the transfer.
    pub fee: Decimal,
    /// Amount disbursed after the fee.
    pub actual_amount: Decimal,
}

/// Ground-truth transfer state reported by a reconciliation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// Still in flight at the gateway.
    Processing,
    /// The transfer completed.
    Succeeded,
    /// The transfer was rejected or closed.
    Failed,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    /// Human-readable message, logged with the payload for audit.
    pub message: String,

    /// Whether a retry could plausibly succeed. Network faults and gateway
    /// unavailability are retryable; a rejected account or parameter is not.
    pub retryable: bool,
}

impl GatewayError {
    /// Creates a retryable error (network fault, gateway unavailable).
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a permanent rejection (bad account, refused parameters).
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for WithdrawalError {
    fn from(err: GatewayError) -> Self {
        WithdrawalError::gateway(err.message, err.retryable)
    }
}
