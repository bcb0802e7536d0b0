//! Withdrawal eligibility rules.
//!
//! The legal (confirmation mode, task status) combinations are encoded as an
//! explicit table rather than scattered boolean checks, so the set of
//! payout-eligible states is auditable and testable in isolation.

use rust_decimal::Decimal;

use crate::domain::foundation::{AuthContext, UserId};
use crate::domain::task::{ConfirmationMode, Task, TaskStatus};

use super::errors::WithdrawalError;

/// The only (mode, status) pairs from which a payout may start.
const WITHDRAWABLE: [(ConfirmationMode, TaskStatus); 2] = [
    (ConfirmationMode::AdminOnly, TaskStatus::AdminConfirmed),
    (ConfirmationMode::AuthorRequired, TaskStatus::AuthorConfirmed),
];

/// Returns true if a task with the given confirmation mode and status is
/// eligible for payout.
pub fn can_withdraw(mode: ConfirmationMode, status: TaskStatus) -> bool {
    WITHDRAWABLE.contains(&(mode, status))
}

/// Validates a withdrawal submission against a task and its caller.
///
/// Checks are ordered cheapest-first: field validation, then authorization,
/// then the eligibility table. The "no prior record" rule is enforced by the
/// repository's uniqueness constraint, not here - this validator is pure.
pub struct WithdrawalValidator;

impl WithdrawalValidator {
    /// Validates the submission and returns the payee (the task's assignee).
    pub fn validate(
        task: &Task,
        caller: &AuthContext,
        amount: Decimal,
        account_type: &str,
        account_info: &str,
    ) -> Result<UserId, WithdrawalError> {
        if amount <= Decimal::ZERO {
            return Err(WithdrawalError::validation("amount", "must be positive"));
        }
        if amount > Decimal::from(task.points) {
            return Err(WithdrawalError::validation(
                "amount",
                format!("exceeds task value of {}", task.points),
            ));
        }
        if account_type.trim().is_empty() {
            return Err(WithdrawalError::validation("account_type", "must not be empty"));
        }
        if account_info.trim().is_empty() {
            return Err(WithdrawalError::validation("account_info", "must not be empty"));
        }

        let payee = task.assignee.ok_or_else(|| {
            WithdrawalError::validation("task", "task has no assignee to pay out")
        })?;

        if !caller.is_admin && caller.user_id != payee {
            return Err(WithdrawalError::unauthorized(
                "only the task assignee or an admin may request the payout",
            ));
        }

        if !can_withdraw(task.confirmation, task.status) {
            return Err(WithdrawalError::not_withdrawable(task.id, task.status));
        }

        Ok(payee)
    }
}
