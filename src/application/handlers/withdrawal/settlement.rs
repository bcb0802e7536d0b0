//! Settlement application service.
//!
//! Applies a terminal gateway outcome to a withdrawal: the conditional
//! record/task transition through the repository, then the one-shot point
//! credit for successful payouts. Both the notification handler and the
//! reconciliation handler converge on this path, so redeliveries and
//! callback/reconcile races resolve identically.

use std::sync::Arc;

use crate::domain::foundation::TaskId;
use crate::domain::ledger::LedgerActor;
use crate::domain::withdrawal::{SettlementOutcome, WithdrawRecord, WithdrawStatus, WithdrawalError};
use crate::ports::{PointLedger, SettleResult, TaskRepository, WithdrawalRepository};

/// Result of applying an outcome to a withdrawal.
#[derive(Debug, Clone)]
pub enum AppliedSettlement {
    /// This call performed the transition.
    Applied(WithdrawRecord),
    /// The record was already terminal; no side effects were re-triggered.
    Duplicate(WithdrawStatus),
    /// No withdrawal record exists for the task.
    NotFound,
}

/// Applies settlement outcomes idempotently.
#[derive(Clone)]
pub struct SettlementService {
    withdrawals: Arc<dyn WithdrawalRepository>,
    tasks: Arc<dyn TaskRepository>,
    ledger: Arc<dyn PointLedger>,
}

impl SettlementService {
    pub fn new(
        withdrawals: Arc<dyn WithdrawalRepository>,
        tasks: Arc<dyn TaskRepository>,
        ledger: Arc<dyn PointLedger>,
    ) -> Self {
        Self {
            withdrawals,
            tasks,
            ledger,
        }
    }

    /// Applies `outcome` to the task's withdrawal record.
    ///
    /// The repository performs the compare-and-swap (record must still be
    /// `Processing`) together with the task status change in one atomic unit.
    /// Point crediting is keyed on winning that swap, which is what makes a
    /// redelivered success notification credit exactly once.
    pub async fn apply_outcome(
        &self,
        task_id: TaskId,
        outcome: SettlementOutcome,
        gateway_order_id: Option<&str>,
        gateway_payload: Option<&str>,
    ) -> Result<AppliedSettlement, WithdrawalError> {
        let result = self
            .withdrawals
            .try_settle(task_id, outcome, gateway_order_id, gateway_payload)
            .await?;

        match result {
            SettleResult::NotFound => Ok(AppliedSettlement::NotFound),
            SettleResult::AlreadyTerminal(status) => {
                tracing::info!(
                    task_id = %task_id,
                    status = ?status,
                    "duplicate settlement delivery ignored"
                );
                Ok(AppliedSettlement::Duplicate(status))
            }
            SettleResult::Applied(record) => {
                if outcome == SettlementOutcome::Success {
                    self.credit_payee(task_id, &record).await?;
                }
                tracing::info!(
                    task_id = %task_id,
                    withdraw_id = %record.id,
                    status = ?record.status,
                    "withdrawal settled"
                );
                Ok(AppliedSettlement::Applied(record))
            }
        }
    }

    async fn credit_payee(
        &self,
        task_id: TaskId,
        record: &WithdrawRecord,
    ) -> Result<(), WithdrawalError> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| {
                WithdrawalError::infrastructure(format!(
                    "task {} vanished while settling its withdrawal",
                    task_id
                ))
            })?;

        self.ledger
            .credit(
                record.user_id,
                task.points,
                LedgerActor::Settlement,
                "task payout settled",
            )
            .await
            .map_err(|e| {
                // The transition already happened; a lost credit here needs
                // the audit trail, so it must be loud.
                tracing::error!(
                    task_id = %task_id,
                    withdraw_id = %record.id,
                    user_id = %record.user_id,
                    error = %e,
                    "settlement applied but point credit failed"
                );
                WithdrawalError::from(e)
            })?;
        Ok(())
    }
}
