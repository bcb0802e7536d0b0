//! Task lifecycle status and confirmation mode.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a task.
///
/// Payout-relevant states: a task becomes withdrawable only once confirmed
/// (by its author or by an admin, depending on [`ConfirmationMode`]), moves to
/// `WithdrawRequested` when a withdrawal is submitted, and ends in `Settled`
/// or `PayoutFailed` depending on the gateway outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is published and open for claiming.
    Published,
    /// Task has been claimed by an assignee.
    Claimed,
    /// Work has been delivered and awaits confirmation.
    Submitted,
    /// The task author confirmed the delivered work.
    AuthorConfirmed,
    /// An admin confirmed the delivered work.
    AdminConfirmed,
    /// A withdrawal has been submitted for this task.
    WithdrawRequested,
    /// The payout completed successfully.
    Settled,
    /// The payout was rejected by the gateway.
    PayoutFailed,
}

impl StateMachine for TaskStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TaskStatus::*;
        matches!(
            (self, target),
            (Published, Claimed)
                | (Claimed, Submitted)
                | (Submitted, AuthorConfirmed)
                | (Submitted, AdminConfirmed)
                | (AuthorConfirmed, WithdrawRequested)
                | (AdminConfirmed, WithdrawRequested)
                | (WithdrawRequested, Settled)
                | (WithdrawRequested, PayoutFailed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TaskStatus::*;
        match self {
            Published => vec![Claimed],
            Claimed => vec![Submitted],
            Submitted => vec![AuthorConfirmed, AdminConfirmed],
            AuthorConfirmed => vec![WithdrawRequested],
            AdminConfirmed => vec![WithdrawRequested],
            WithdrawRequested => vec![Settled, PayoutFailed],
            Settled => vec![],
            PayoutFailed => vec![],
        }
    }
}

/// Whose confirmation makes a task eligible for payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
    /// An admin's confirmation alone releases the payout.
    AdminOnly,
    /// The task author must confirm before payout.
    AuthorRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_statuses_lead_to_withdraw_requested() {
        assert!(TaskStatus::AuthorConfirmed.can_transition_to(&TaskStatus::WithdrawRequested));
        assert!(TaskStatus::AdminConfirmed.can_transition_to(&TaskStatus::WithdrawRequested));
    }

    #[test]
    fn withdraw_requested_resolves_to_settled_or_failed() {
        assert!(TaskStatus::WithdrawRequested.can_transition_to(&TaskStatus::Settled));
        assert!(TaskStatus::WithdrawRequested.can_transition_to(&TaskStatus::PayoutFailed));
    }

    #[test]
    fn settled_and_payout_failed_are_terminal() {
        assert!(TaskStatus::Settled.is_terminal());
        assert!(TaskStatus::PayoutFailed.is_terminal());
    }

    #[test]
    fn unconfirmed_statuses_cannot_request_withdrawal() {
        for status in [
            TaskStatus::Published,
            TaskStatus::Claimed,
            TaskStatus::Submitted,
        ] {
            assert!(!status.can_transition_to(&TaskStatus::WithdrawRequested));
        }
    }

    #[test]
    fn settled_cannot_reenter_lifecycle() {
        assert!(!TaskStatus::Settled.can_transition_to(&TaskStatus::WithdrawRequested));
        assert!(!TaskStatus::Settled.can_transition_to(&TaskStatus::Published));
    }
}
