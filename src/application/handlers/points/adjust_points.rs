//! AdjustPointsHandler - admin-side manual balance adjustment through the
//! ledger.

use std::sync::Arc;

use crate::domain::foundation::{AuthContext, UserId};
use crate::domain::ledger::{LedgerActor, LedgerEntry};
use crate::domain::withdrawal::WithdrawalError;
use crate::ports::PointLedger;

/// Command to adjust a user's point balance.
#[derive(Debug, Clone)]
pub struct AdjustPointsCommand {
    pub caller: AuthContext,
    pub user_id: UserId,
    /// Signed delta; positive credits, negative debits.
    pub delta: i64,
    pub reason: String,
}

/// Handler for admin point adjustments.
pub struct AdjustPointsHandler {
    ledger: Arc<dyn PointLedger>,
}

impl AdjustPointsHandler {
    pub fn new(ledger: Arc<dyn PointLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, cmd: AdjustPointsCommand) -> Result<LedgerEntry, WithdrawalError> {
        if !cmd.caller.is_admin {
            return Err(WithdrawalError::unauthorized(
                "only admins may adjust balances",
            ));
        }
        if cmd.delta == 0 {
            return Err(WithdrawalError::validation("delta", "must not be zero"));
        }
        if cmd.reason.trim().is_empty() {
            return Err(WithdrawalError::validation("reason", "must not be empty"));
        }

        let actor = LedgerActor::Admin(cmd.caller.user_id);
        let entry = if cmd.delta > 0 {
            self.ledger
                .credit(cmd.user_id, cmd.delta, actor, &cmd.reason)
                .await?
        } else {
            self.ledger
                .debit(cmd.user_id, -cmd.delta, actor, &cmd.reason)
                .await?
        };

        tracing::info!(
            user_id = %cmd.user_id,
            delta = cmd.delta,
            actor = %actor,
            "admin point adjustment applied"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockLedger {
        balance: Mutex<i64>,
        entries: Mutex<Vec<LedgerEntry>>,
    }

    impl MockLedger {
        fn with_balance(balance: i64) -> Self {
            Self {
                balance: Mutex::new(balance),
                entries: Mutex::new(Vec::new()),
            }
        }

        fn entries(&self) -> Vec<LedgerEntry> {
            self.entries.lock().unwrap().clone()
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
            let mut balance = self.balance.lock().unwrap();
            *balance += amount;
            let entry = LedgerEntry::new(user_id, actor, amount, *balance, reason);
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        async fn debit(
            &self,
            user_id: UserId,
            amount: i64,
            actor: LedgerActor,
            reason: &str,
        ) -> Result<LedgerEntry, DomainError> {
            let mut balance = self.balance.lock().unwrap();
            if *balance < amount {
                return Err(DomainError::new(
                    ErrorCode::InsufficientBalance,
                    format!("balance {}, requested {}", *balance, amount),
                ));
            }
            *balance -= amount;
            let entry = LedgerEntry::new(user_id, actor, -amount, *balance, reason);
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }
    }

    fn admin_cmd(delta: i64) -> AdjustPointsCommand {
        AdjustPointsCommand {
            caller: AuthContext::admin(UserId::new(99)),
            user_id: UserId::new(20),
            delta,
            reason: "compensation".to_string(),
        }
    }

    #[tokio::test]
    async fn positive_delta_credits_with_admin_actor() {
        let ledger = Arc::new(MockLedger::with_balance(10));
        let handler = AdjustPointsHandler::new(ledger.clone());

        let entry = handler.handle(admin_cmd(50)).await.unwrap();

        assert_eq!(entry.delta, 50);
        assert_eq!(entry.balance_after, 60);
        assert_eq!(entry.actor, LedgerActor::Admin(UserId::new(99)));
        assert_eq!(ledger.entries().len(), 1);
    }

    #[tokio::test]
    async fn negative_delta_debits() {
        let ledger = Arc::new(MockLedger::with_balance(10));
        let handler = AdjustPointsHandler::new(ledger);

        let entry = handler.handle(admin_cmd(-4)).await.unwrap();

        assert_eq!(entry.delta, -4);
        assert_eq!(entry.balance_after, 6);
    }

    #[tokio::test]
    async fn overdraft_surfaces_insufficient_balance() {
        let ledger = Arc::new(MockLedger::with_balance(3));
        let handler = AdjustPointsHandler::new(ledger);

        let result = handler.handle(admin_cmd(-10)).await;
        assert!(matches!(result, Err(WithdrawalError::InsufficientBalance(_))));
    }

    #[tokio::test]
    async fn non_admin_is_rejected() {
        let ledger = Arc::new(MockLedger::with_balance(10));
        let handler = AdjustPointsHandler::new(ledger.clone());

        let mut cmd = admin_cmd(5);
        cmd.caller = AuthContext::user(UserId::new(20));
        let result = handler.handle(cmd).await;

        assert!(matches!(result, Err(WithdrawalError::Unauthorized(_))));
        assert!(ledger.entries().is_empty());
    }

    #[tokio::test]
    async fn zero_delta_and_empty_reason_are_rejected() {
        let ledger = Arc::new(MockLedger::with_balance(10));
        let handler = AdjustPointsHandler::new(ledger);

        let result = handler.handle(admin_cmd(0)).await;
        assert!(matches!(result, Err(WithdrawalError::ValidationFailed { .. })));

        let mut cmd = admin_cmd(5);
        cmd.reason = "  ".to_string();
        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(WithdrawalError::ValidationFailed { .. })));
    }
}
