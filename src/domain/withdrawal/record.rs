//! Withdrawal record and its settlement state machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, TaskId, Timestamp, UserId, ValidationError, WithdrawId};
use crate::domain::task::TaskStatus;

/// Status of a withdrawal record.
///
/// `Processing` is the sole initial state. The terminal states have no
/// outgoing transitions: once settled, a record never moves again, which is
/// what makes redelivered gateway notifications safe no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawStatus {
    /// Submitted to the gateway, outcome not yet known.
    Processing,
    /// The gateway confirmed the disbursement.
    Success,
    /// The gateway rejected the disbursement.
    Failed,
    /// Closed administratively without a gateway outcome.
    Closed,
}

impl StateMachine for WithdrawStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use WithdrawStatus::*;
        matches!(
            (self, target),
            (Processing, Success) | (Processing, Failed) | (Processing, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use WithdrawStatus::*;
        match self {
            Processing => vec![Success, Failed, Closed],
            Success | Failed | Closed => vec![],
        }
    }
}

/// Terminal outcome applied to a processing withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Disbursement confirmed by the gateway.
    Success,
    /// Disbursement rejected by the gateway.
    Failed,
}

impl SettlementOutcome {
    /// The record status this outcome settles to.
    pub fn record_status(&self) -> WithdrawStatus {
        match self {
            SettlementOutcome::Success => WithdrawStatus::Success,
            SettlementOutcome::Failed => WithdrawStatus::Failed,
        }
    }

    /// The task status advanced alongside the record.
    pub fn task_status(&self) -> TaskStatus {
        match self {
            SettlementOutcome::Success => TaskStatus::Settled,
            SettlementOutcome::Failed => TaskStatus::PayoutFailed,
        }
    }
}

/// A payout attempt for a task.
///
/// At most one record exists per task; the `task_id` uniqueness constraint is
/// the concurrency-control primitive for "first submission wins".
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawRecord {
    pub id: WithdrawId,
    pub task_id: TaskId,
    /// The payee (the task's assignee at submission time).
    pub user_id: UserId,
    /// Requested amount.
    pub amount: Decimal,
    /// Fee charged by the gateway, known after submission.
    pub fee: Option<Decimal>,
    /// Amount actually disbursed, known after submission.
    pub actual_amount: Option<Decimal>,
    pub account_type: String,
    pub account_info: String,
    pub status: WithdrawStatus,
    /// The business reference sent to the gateway (out_trade_no).
    pub reference: String,
    /// The gateway's own order identifier.
    pub gateway_order_id: Option<String>,
    /// Raw notification payload retained for audit.
    pub gateway_payload: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WithdrawRecord {
    /// Creates a record in the initial `Processing` state.
    #[allow(clippy::too_many_arguments)]
    pub fn processing(
        id: WithdrawId,
        task_id: TaskId,
        user_id: UserId,
        amount: Decimal,
        account_type: impl Into<String>,
        account_info: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            task_id,
            user_id,
            amount,
            fee: None,
            actual_amount: None,
            account_type: account_type.into(),
            account_info: account_info.into(),
            status: WithdrawStatus::Processing,
            reference: reference.into(),
            gateway_order_id: None,
            gateway_payload: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the gateway's computed fee and order identifier after a
    /// successful submission. The record stays in `Processing` until the
    /// asynchronous outcome arrives.
    pub fn attach_receipt(
        &mut self,
        gateway_order_id: impl Into<String>,
        fee: Decimal,
        actual_amount: Decimal,
    ) {
        self.gateway_order_id = Some(gateway_order_id.into());
        self.fee = Some(fee);
        self.actual_amount = Some(actual_amount);
        self.updated_at = Timestamp::now();
    }

    /// Applies a terminal outcome, enforcing the state machine.
    pub fn settle(&mut self, outcome: SettlementOutcome) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(outcome.record_status())?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Whether the record still awaits an outcome.
    pub fn is_processing(&self) -> bool {
        self.status == WithdrawStatus::Processing
    }
}
