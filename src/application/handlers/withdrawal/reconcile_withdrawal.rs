//! ReconcileWithdrawalHandler - resolves stale processing records against
//! gateway ground truth.
//!
//! A record stuck in `Processing` past the staleness window (lost callback,
//! crash between the gateway call and the receipt write) is never silently
//! resubmitted. Reconciliation queries the gateway for the transfer's actual
//! state and applies the same compare-and-swap settlement the callback path
//! uses, so a racing late callback and a reconcile run converge.

use std::sync::Arc;

use crate::domain::foundation::{AuthContext, WithdrawId};
use crate::domain::withdrawal::{SettlementOutcome, WithdrawStatus, WithdrawalError};
use crate::ports::{PaymentGateway, TransferState, WithdrawalRepository};

use super::settlement::{AppliedSettlement, SettlementService};

/// Command to reconcile one withdrawal.
#[derive(Debug, Clone)]
pub struct ReconcileWithdrawalCommand {
    pub caller: AuthContext,
    pub withdraw_id: WithdrawId,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Ground truth was terminal; the record has been settled accordingly.
    Settled { status: WithdrawStatus },
    /// The gateway still reports the transfer in flight.
    StillProcessing,
    /// The record was already terminal (a callback beat us to it).
    AlreadyTerminal { status: WithdrawStatus },
}

/// Handler for admin-triggered reconciliation.
pub struct ReconcileWithdrawalHandler {
    withdrawals: Arc<dyn WithdrawalRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settlement: SettlementService,
}

impl ReconcileWithdrawalHandler {
    pub fn new(
        withdrawals: Arc<dyn WithdrawalRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settlement: SettlementService,
    ) -> Self {
        Self {
            withdrawals,
            gateway,
            settlement,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileWithdrawalCommand,
    ) -> Result<ReconcileOutcome, WithdrawalError> {
        if !cmd.caller.is_admin {
            return Err(WithdrawalError::unauthorized(
                "only admins may reconcile withdrawals",
            ));
        }

        let record = self
            .withdrawals
            .find_by_id(cmd.withdraw_id)
            .await?
            .ok_or_else(|| WithdrawalError::not_found(cmd.withdraw_id))?;

        if !record.is_processing() {
            return Ok(ReconcileOutcome::AlreadyTerminal {
                status: record.status,
            });
        }

        let state = self.gateway.query_transfer(&record.reference).await?;
        tracing::info!(
            withdraw_id = %record.id,
            task_id = %record.task_id,
            state = ?state,
            "reconciliation queried gateway ground truth"
        );

        let outcome = match state {
            TransferState::Processing => return Ok(ReconcileOutcome::StillProcessing),
            TransferState::Succeeded => SettlementOutcome::Success,
            TransferState::Failed => SettlementOutcome::Failed,
        };

        match self
            .settlement
            .apply_outcome(record.task_id, outcome, None, None)
            .await?
        {
            AppliedSettlement::Applied(record) => Ok(ReconcileOutcome::Settled {
                status: record.status,
            }),
            AppliedSettlement::Duplicate(status) => {
                Ok(ReconcileOutcome::AlreadyTerminal { status })
            }
            AppliedSettlement::NotFound => Err(WithdrawalError::infrastructure(format!(
                "withdrawal {} vanished during reconciliation",
                cmd.withdraw_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode, TaskId, UserId};
    use crate::domain::ledger::{LedgerActor, LedgerEntry};
    use crate::domain::task::{ConfirmationMode, Task};
    use crate::domain::withdrawal::WithdrawRecord;
    use crate::ports::{
        GatewayError, PointLedger, SettleResult, TaskRepository, TransferReceipt,
        TransferRequest, WithdrawalFilter,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // ══════════════════════════════════════════════════════════════
    // Mock Implementations
    // ══════════════════════════════════════════════════════════════

    struct MockTaskRepository {
        task: Option<Task>,
    }

    #[async_trait]
    impl TaskRepository for MockTaskRepository {
        async fn find_by_id(&self, _id: TaskId) -> Result<Option<Task>, DomainError> {
            Ok(self.task.clone())
        }
    }

    struct MockWithdrawalRepository {
        records: Mutex<Vec<WithdrawRecord>>,
    }

    impl MockWithdrawalRepository {
        fn with_record(record: WithdrawRecord) -> Self {
            Self {
                records: Mutex::new(vec![record]),
            }
        }
    }

    #[async_trait]
    impl WithdrawalRepository for MockWithdrawalRepository {
        async fn create_processing(&self, record: &WithdrawRecord) -> Result<(), DomainError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn attach_gateway_receipt(
            &self,
            _id: WithdrawId,
            _gateway_order_id: &str,
            _fee: Decimal,
            _actual_amount: Decimal,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn try_settle(
            &self,
            task_id: TaskId,
            outcome: SettlementOutcome,
            _gateway_order_id: Option<&str>,
            _gateway_payload: Option<&str>,
        ) -> Result<SettleResult, DomainError> {
            let mut records = self.records.lock().unwrap();
            match records.iter_mut().find(|r| r.task_id == task_id) {
                None => Ok(SettleResult::NotFound),
                Some(record) if !record.is_processing() => {
                    Ok(SettleResult::AlreadyTerminal(record.status))
                }
                Some(record) => {
                    record.settle(outcome).map_err(|e| {
                        DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                    })?;
                    Ok(SettleResult::Applied(record.clone()))
                }
            }
        }

        async fn find_by_id(
            &self,
            id: WithdrawId,
        ) -> Result<Option<WithdrawRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn find_by_task_id(
            &self,
            task_id: TaskId,
        ) -> Result<Option<WithdrawRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.task_id == task_id)
                .cloned())
        }

        async fn list(
            &self,
            _filter: WithdrawalFilter,
        ) -> Result<Vec<WithdrawRecord>, DomainError> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    struct MockGateway {
        state: TransferState,
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn submit_transfer(
            &self,
            _request: TransferRequest,
        ) -> Result<TransferReceipt, GatewayError> {
            Err(GatewayError::rejected("not under test"))
        }

        async fn query_transfer(&self, _reference: &str) -> Result<TransferState, GatewayError> {
            Ok(self.state.clone())
        }
    }

    struct MockLedger {
        credits: AtomicU32,
    }

    impl MockLedger {
        fn new() -> Self {
            Self {
                credits: AtomicU32::new(0),
            }
        }

        fn credit_count(&self) -> u32 {
            self.credits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PointLedger for MockLedger {
        async fn credit(
            &self,
            user_id: UserId,
            amount: i64,
            actor: LedgerActor,
            reason: &str,
        ) -> Result<LedgerEntry, DomainError> {
            self.credits.fetch_add(1, Ordering::SeqCst);
            Ok(LedgerEntry::new(user_id, actor, amount, amount, reason))
        }

        async fn debit(
            &self,
            user_id: UserId,
            amount: i64,
            actor: LedgerActor,
            reason: &str,
        ) -> Result<LedgerEntry, DomainError> {
            Ok(LedgerEntry::new(user_id, actor, -amount, 0, reason))
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Test Helpers
    // ══════════════════════════════════════════════════════════════

    fn confirmed_task() -> Task {
        let mut task = Task::publish(
            TaskId::new(10),
            "demo",
            UserId::new(1),
            100,
            ConfirmationMode::AdminOnly,
        );
        task.claim(UserId::new(20)).unwrap();
        task.submit_work().unwrap();
        task.confirm_by_admin().unwrap();
        task
    }

    fn processing_record() -> WithdrawRecord {
        WithdrawRecord::processing(
            WithdrawId::new(),
            TaskId::new(10),
            UserId::new(20),
            Decimal::from(100),
            "bank",
            "6222",
            "WITHDRAW_10_abc",
        )
    }

    fn handler(
        withdrawals: Arc<MockWithdrawalRepository>,
        state: TransferState,
        ledger: Arc<MockLedger>,
    ) -> ReconcileWithdrawalHandler {
        let settlement = SettlementService::new(
            withdrawals.clone(),
            Arc::new(MockTaskRepository {
                task: Some(confirmed_task()),
            }),
            ledger,
        );
        ReconcileWithdrawalHandler::new(withdrawals, Arc::new(MockGateway { state }), settlement)
    }

    // ══════════════════════════════════════════════════════════════
    // Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn succeeded_ground_truth_settles_and_credits() {
        let record = processing_record();
        let id = record.id;
        let withdrawals = Arc::new(MockWithdrawalRepository::with_record(record));
        let ledger = Arc::new(MockLedger::new());
        let handler = handler(withdrawals, TransferState::Succeeded, ledger.clone());

        let outcome = handler
            .handle(ReconcileWithdrawalCommand {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: id,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Settled {
                status: WithdrawStatus::Success
            }
        );
        assert_eq!(ledger.credit_count(), 1);
    }

    #[tokio::test]
    async fn failed_ground_truth_settles_to_failed() {
        let record = processing_record();
        let id = record.id;
        let withdrawals = Arc::new(MockWithdrawalRepository::with_record(record));
        let ledger = Arc::new(MockLedger::new());
        let handler = handler(withdrawals, TransferState::Failed, ledger.clone());

        let outcome = handler
            .handle(ReconcileWithdrawalCommand {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: id,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Settled {
                status: WithdrawStatus::Failed
            }
        );
        assert_eq!(ledger.credit_count(), 0);
    }

    #[tokio::test]
    async fn in_flight_transfer_is_left_untouched() {
        let record = processing_record();
        let id = record.id;
        let withdrawals = Arc::new(MockWithdrawalRepository::with_record(record));
        let handler = handler(
            withdrawals.clone(),
            TransferState::Processing,
            Arc::new(MockLedger::new()),
        );

        let outcome = handler
            .handle(ReconcileWithdrawalCommand {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: id,
            })
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::StillProcessing);
        assert_eq!(
            withdrawals.find_by_id(id).await.unwrap().unwrap().status,
            WithdrawStatus::Processing
        );
    }

    #[tokio::test]
    async fn terminal_record_short_circuits_without_gateway_query() {
        let mut record = processing_record();
        record.settle(SettlementOutcome::Success).unwrap();
        let id = record.id;
        let withdrawals = Arc::new(MockWithdrawalRepository::with_record(record));
        let handler = handler(withdrawals, TransferState::Failed, Arc::new(MockLedger::new()));

        let outcome = handler
            .handle(ReconcileWithdrawalCommand {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: id,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::AlreadyTerminal {
                status: WithdrawStatus::Success
            }
        );
    }

    #[tokio::test]
    async fn non_admin_callers_are_rejected() {
        let record = processing_record();
        let id = record.id;
        let withdrawals = Arc::new(MockWithdrawalRepository::with_record(record));
        let handler = handler(
            withdrawals,
            TransferState::Succeeded,
            Arc::new(MockLedger::new()),
        );

        let result = handler
            .handle(ReconcileWithdrawalCommand {
                caller: AuthContext::user(UserId::new(20)),
                withdraw_id: id,
            })
            .await;

        assert!(matches!(result, Err(WithdrawalError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn unknown_withdrawal_is_not_found() {
        let withdrawals = Arc::new(MockWithdrawalRepository::with_record(processing_record()));
        let handler = handler(
            withdrawals,
            TransferState::Succeeded,
            Arc::new(MockLedger::new()),
        );

        let result = handler
            .handle(ReconcileWithdrawalCommand {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: WithdrawId::new(),
            })
            .await;

        assert!(matches!(result, Err(WithdrawalError::NotFound(_))));
    }
}
