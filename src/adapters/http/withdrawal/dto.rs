//! HTTP DTOs for withdrawal endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::withdrawal::{ReconcileOutcome, SubmitWithdrawalResult};
use crate::domain::withdrawal::{WithdrawRecord, WithdrawStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to submit a withdrawal for a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWithdrawalRequest {
    pub task_id: i64,
    pub amount: Decimal,
    pub account_type: String,
    pub account_info: String,
}

/// Query parameters for the withdrawal listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListWithdrawalsParams {
    /// When true, only stale processing records are returned.
    #[serde(default)]
    pub stale: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response to a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSubmittedResponse {
    pub withdraw_id: String,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
    pub status: WithdrawStatus,
}

impl From<SubmitWithdrawalResult> for WithdrawalSubmittedResponse {
    fn from(result: SubmitWithdrawalResult) -> Self {
        Self {
            withdraw_id: result.withdraw_id.to_string(),
            amount: result.amount,
            fee: result.fee,
            actual_amount: result.actual_amount,
            status: result.status,
        }
    }
}

/// Withdrawal record view. Account details are limited to the type; the full
/// destination never leaves the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalViewResponse {
    pub withdraw_id: String,
    pub task_id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
    pub account_type: String,
    pub status: WithdrawStatus,
    pub gateway_order_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WithdrawRecord> for WithdrawalViewResponse {
    fn from(record: WithdrawRecord) -> Self {
        Self {
            withdraw_id: record.id.to_string(),
            task_id: record.task_id.as_i64(),
            user_id: record.user_id.as_i64(),
            amount: record.amount,
            fee: record.fee,
            actual_amount: record.actual_amount,
            account_type: record.account_type,
            status: record.status,
            gateway_order_id: record.gateway_order_id,
            created_at: record.created_at.as_datetime().to_rfc3339(),
            updated_at: record.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response to a reconciliation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub outcome: &'static str,
    pub status: Option<WithdrawStatus>,
}

impl From<ReconcileOutcome> for ReconcileResponse {
    fn from(outcome: ReconcileOutcome) -> Self {
        match outcome {
            ReconcileOutcome::Settled { status } => Self {
                outcome: "settled",
                status: Some(status),
            },
            ReconcileOutcome::StillProcessing => Self {
                outcome: "still_processing",
                status: Some(WithdrawStatus::Processing),
            },
            ReconcileOutcome::AlreadyTerminal { status } => Self {
                outcome: "already_terminal",
                status: Some(status),
            },
        }
    }
}
