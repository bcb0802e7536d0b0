//! SubmitWithdrawalHandler - Command handler for starting a payout.
//!
//! The write order is the whole design: the `Processing` record is persisted
//! *before* the gateway call, so a crash mid-call leaves a recoverable record
//! rather than a silent double-payout risk, and the `task_id` uniqueness
//! constraint settles submission races before any money moves.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::foundation::{AuthContext, ErrorCode, TaskId, WithdrawId};
use crate::domain::withdrawal::{
    reference, SettlementOutcome, WithdrawRecord, WithdrawStatus, WithdrawalError,
    WithdrawalValidator,
};
use crate::ports::{PaymentGateway, TaskRepository, WithdrawalRepository};

/// Command to submit a withdrawal for a task.
#[derive(Debug, Clone)]
pub struct SubmitWithdrawalCommand {
    pub caller: AuthContext,
    pub task_id: TaskId,
    pub amount: Decimal,
    pub account_type: String,
    pub account_info: String,
}

/// Result of a submission that reached the gateway.
#[derive(Debug, Clone)]
pub struct SubmitWithdrawalResult {
    pub withdraw_id: WithdrawId,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
    pub status: WithdrawStatus,
}

/// Handler for withdrawal submissions.
pub struct SubmitWithdrawalHandler {
    tasks: Arc<dyn TaskRepository>,
    withdrawals: Arc<dyn WithdrawalRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl SubmitWithdrawalHandler {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        withdrawals: Arc<dyn WithdrawalRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            tasks,
            withdrawals,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitWithdrawalCommand,
    ) -> Result<SubmitWithdrawalResult, WithdrawalError> {
        // 1. Load the task and reject an existing record first: a loser of a
        //    submission race must see a conflict, not the state error its
        //    winner's task transition would otherwise produce. The uniqueness
        //    constraint below remains the authoritative check under races.
        let task = self
            .tasks
            .find_by_id(cmd.task_id)
            .await?
            .ok_or_else(|| WithdrawalError::task_not_found(cmd.task_id))?;

        if self
            .withdrawals
            .find_by_task_id(cmd.task_id)
            .await?
            .is_some()
        {
            return Err(WithdrawalError::already_requested(cmd.task_id));
        }

        // 2. Check eligibility against the loaded snapshot.
        let payee = WithdrawalValidator::validate(
            &task,
            &cmd.caller,
            cmd.amount,
            &cmd.account_type,
            &cmd.account_info,
        )?;

        // 3. Persist Processing and advance the task, atomically, before any
        //    external side effect.
        let record = WithdrawRecord::processing(
            WithdrawId::new(),
            task.id,
            payee,
            cmd.amount,
            cmd.account_type.clone(),
            cmd.account_info.clone(),
            reference::encode(task.id),
        );

        self.withdrawals
            .create_processing(&record)
            .await
            .map_err(|e| match e.code {
                ErrorCode::WithdrawalExists => WithdrawalError::already_requested(cmd.task_id),
                _ => WithdrawalError::from(e),
            })?;

        // 4. Submit to the gateway, outside any transaction.
        match self
            .gateway
            .submit_transfer(crate::ports::TransferRequest {
                reference: record.reference.clone(),
                amount: cmd.amount,
                account_type: cmd.account_type.clone(),
                account_info: cmd.account_info.clone(),
            })
            .await
        {
            Ok(receipt) => {
                self.withdrawals
                    .attach_gateway_receipt(
                        record.id,
                        &receipt.gateway_order_id,
                        receipt.fee,
                        receipt.actual_amount,
                    )
                    .await?;

                tracing::info!(
                    task_id = %task.id,
                    withdraw_id = %record.id,
                    gateway_order_id = %receipt.gateway_order_id,
                    "withdrawal submitted to gateway"
                );

                Ok(SubmitWithdrawalResult {
                    withdraw_id: record.id,
                    amount: cmd.amount,
                    fee: Some(receipt.fee),
                    actual_amount: Some(receipt.actual_amount),
                    status: WithdrawStatus::Processing,
                })
            }
            Err(e) if e.retryable => {
                // Left in Processing: reconciliation queries the gateway for
                // ground truth instead of blindly resubmitting.
                tracing::warn!(
                    task_id = %task.id,
                    withdraw_id = %record.id,
                    error = %e,
                    "gateway submission failed transiently; record left processing"
                );
                Err(e.into())
            }
            Err(e) => {
                tracing::error!(
                    task_id = %task.id,
                    withdraw_id = %record.id,
                    error = %e,
                    "gateway rejected the submission"
                );
                if let Err(settle_err) = self
                    .withdrawals
                    .try_settle(task.id, SettlementOutcome::Failed, None, None)
                    .await
                {
                    tracing::error!(
                        task_id = %task.id,
                        error = %settle_err,
                        "failed to mark rejected withdrawal as failed"
                    );
                }
                Err(e.into())
            }
        }
    }
}
