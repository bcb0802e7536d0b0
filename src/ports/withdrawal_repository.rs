//! Withdrawal repository port.
//!
//! Two properties of the schema are load-bearing for correctness and are part
//! of this contract, not incidental storage behavior:
//!
//! - the `task_id` uniqueness constraint is the mutual-exclusion mechanism for
//!   "first submission wins" among racing submissions;
//! - settlement is a compare-and-swap keyed on `status = Processing`, so
//!   concurrent duplicate notifications converge to exactly one transition.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::foundation::{DomainError, TaskId, Timestamp, WithdrawId};
use crate::domain::withdrawal::{SettlementOutcome, WithdrawRecord, WithdrawStatus};

/// Result of the conditional settlement update.
#[derive(Debug, Clone, PartialEq)]
pub enum SettleResult {
    /// This caller won the compare-and-swap; the record and task were updated.
    Applied(WithdrawRecord),
    /// The record was already terminal; nothing changed.
    AlreadyTerminal(WithdrawStatus),
    /// No record exists for the task.
    NotFound,
}

/// Filter for withdrawal listings.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalFilter {
    pub status: Option<WithdrawStatus>,
    /// Only records created before this instant (stale-processing queries).
    pub created_before: Option<Timestamp>,
}

/// Persistence for withdrawal records and their settlement transitions.
#[async_trait]
pub trait WithdrawalRepository: Send + Sync {
    /// Persists a new `Processing` record and advances its task to the
    /// withdraw-requested status, atomically.
    ///
    /// # Errors
    ///
    /// Returns a `WithdrawalExists` error when a record for the task already
    /// exists (any status): the losing side of a submission race, or a retry
    /// that must go through reconciliation instead.
    async fn create_processing(&self, record: &WithdrawRecord) -> Result<(), DomainError>;

    /// Attaches the gateway's receipt to a still-processing record.
    async fn attach_gateway_receipt(
        &self,
        id: WithdrawId,
        gateway_order_id: &str,
        fee: Decimal,
        actual_amount: Decimal,
    ) -> Result<(), DomainError>;

    /// Applies a terminal outcome if and only if the record is still
    /// `Processing`, updating the task status in the same atomic unit.
    ///
    /// `gateway_order_id` fills the record's order id when the submission-time
    /// receipt never arrived; `gateway_payload` is retained for audit.
    async fn try_settle(
        &self,
        task_id: TaskId,
        outcome: SettlementOutcome,
        gateway_order_id: Option<&str>,
        gateway_payload: Option<&str>,
    ) -> Result<SettleResult, DomainError>;

    /// Loads a record by its id.
    async fn find_by_id(&self, id: WithdrawId) -> Result<Option<WithdrawRecord>, DomainError>;

    /// Loads the record for a task, if any.
    async fn find_by_task_id(&self, task_id: TaskId)
        -> Result<Option<WithdrawRecord>, DomainError>;

    /// Lists records matching the filter, newest first.
    async fn list(&self, filter: WithdrawalFilter) -> Result<Vec<WithdrawRecord>, DomainError>;
}
