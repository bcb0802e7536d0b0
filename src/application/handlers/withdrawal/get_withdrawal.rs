//! Query handlers for withdrawal records.

use std::sync::Arc;

use crate::domain::foundation::{AuthContext, Timestamp, WithdrawId};
use crate::domain::withdrawal::{WithdrawRecord, WithdrawStatus, WithdrawalError};
use crate::ports::{WithdrawalFilter, WithdrawalRepository};

/// Query for a single withdrawal by id.
#[derive(Debug, Clone)]
pub struct GetWithdrawalQuery {
    pub caller: AuthContext,
    pub withdraw_id: WithdrawId,
}

/// Handler resolving a withdrawal id to its current record.
pub struct GetWithdrawalHandler {
    withdrawals: Arc<dyn WithdrawalRepository>,
}

impl GetWithdrawalHandler {
    pub fn new(withdrawals: Arc<dyn WithdrawalRepository>) -> Self {
        Self { withdrawals }
    }

    pub async fn handle(&self, query: GetWithdrawalQuery) -> Result<WithdrawRecord, WithdrawalError> {
        let record = self
            .withdrawals
            .find_by_id(query.withdraw_id)
            .await?
            .ok_or_else(|| WithdrawalError::not_found(query.withdraw_id))?;

        if !query.caller.is_admin && query.caller.user_id != record.user_id {
            // Do not leak existence of other users' withdrawals.
            return Err(WithdrawalError::not_found(query.withdraw_id));
        }

        Ok(record)
    }
}

/// Admin listing query; `stale_only` restricts to processing records older
/// than the staleness window, the candidates for reconciliation.
#[derive(Debug, Clone)]
pub struct ListWithdrawalsQuery {
    pub caller: AuthContext,
    pub stale_only: bool,
    pub stale_after_minutes: i64,
}

/// Handler for the admin withdrawal listing.
pub struct ListWithdrawalsHandler {
    withdrawals: Arc<dyn WithdrawalRepository>,
}

impl ListWithdrawalsHandler {
    pub fn new(withdrawals: Arc<dyn WithdrawalRepository>) -> Self {
        Self { withdrawals }
    }

    pub async fn handle(
        &self,
        query: ListWithdrawalsQuery,
    ) -> Result<Vec<WithdrawRecord>, WithdrawalError> {
        if !query.caller.is_admin {
            return Err(WithdrawalError::unauthorized(
                "only admins may list withdrawals",
            ));
        }

        let filter = if query.stale_only {
            WithdrawalFilter {
                status: Some(WithdrawStatus::Processing),
                created_before: Some(Timestamp::now().minus_minutes(query.stale_after_minutes)),
            }
        } else {
            WithdrawalFilter::default()
        };

        Ok(self.withdrawals.list(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, TaskId, UserId};
    use crate::domain::withdrawal::SettlementOutcome;
    use crate::ports::SettleResult;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    struct MockWithdrawalRepository {
        records: Mutex<Vec<WithdrawRecord>>,
    }

    impl MockWithdrawalRepository {
        fn with_records(records: Vec<WithdrawRecord>) -> Self {
            Self {
                records: Mutex::new(records),
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
            _task_id: TaskId,
            _outcome: SettlementOutcome,
            _gateway_order_id: Option<&str>,
            _gateway_payload: Option<&str>,
        ) -> Result<SettleResult, DomainError> {
            Ok(SettleResult::NotFound)
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
            filter: WithdrawalFilter,
        ) -> Result<Vec<WithdrawRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| filter.status.map_or(true, |s| r.status == s))
                .filter(|r| {
                    filter
                        .created_before
                        .map_or(true, |t| r.created_at.is_before(&t))
                })
                .cloned()
                .collect())
        }
    }

    fn record_for(task_id: i64, user_id: i64) -> WithdrawRecord {
        WithdrawRecord::processing(
            WithdrawId::new(),
            TaskId::new(task_id),
            UserId::new(user_id),
            Decimal::from(100),
            "bank",
            "6222",
            format!("WITHDRAW_{}_x", task_id),
        )
    }

    #[tokio::test]
    async fn owner_can_read_their_withdrawal() {
        let record = record_for(10, 20);
        let id = record.id;
        let repo = Arc::new(MockWithdrawalRepository::with_records(vec![record]));
        let handler = GetWithdrawalHandler::new(repo);

        let found = handler
            .handle(GetWithdrawalQuery {
                caller: AuthContext::user(UserId::new(20)),
                withdraw_id: id,
            })
            .await
            .unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn other_users_get_not_found_rather_than_forbidden() {
        let record = record_for(10, 20);
        let id = record.id;
        let repo = Arc::new(MockWithdrawalRepository::with_records(vec![record]));
        let handler = GetWithdrawalHandler::new(repo);

        let result = handler
            .handle(GetWithdrawalQuery {
                caller: AuthContext::user(UserId::new(77)),
                withdraw_id: id,
            })
            .await;
        assert!(matches!(result, Err(WithdrawalError::NotFound(_))));
    }

    #[tokio::test]
    async fn admin_can_read_any_withdrawal() {
        let record = record_for(10, 20);
        let id = record.id;
        let repo = Arc::new(MockWithdrawalRepository::with_records(vec![record]));
        let handler = GetWithdrawalHandler::new(repo);

        let result = handler
            .handle(GetWithdrawalQuery {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: id,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_withdrawal_is_not_found() {
        let repo = Arc::new(MockWithdrawalRepository::with_records(vec![]));
        let handler = GetWithdrawalHandler::new(repo);

        let result = handler
            .handle(GetWithdrawalQuery {
                caller: AuthContext::admin(UserId::new(99)),
                withdraw_id: WithdrawId::new(),
            })
            .await;
        assert!(matches!(result, Err(WithdrawalError::NotFound(_))));
    }

    #[tokio::test]
    async fn stale_listing_filters_to_old_processing_records() {
        let mut stale = record_for(10, 20);
        stale.created_at = Timestamp::now().minus_minutes(120);
        let mut settled = record_for(11, 20);
        settled.created_at = Timestamp::now().minus_minutes(120);
        settled.settle(SettlementOutcome::Success).unwrap();
        let fresh = record_for(12, 20);

        let stale_id = stale.id;
        let repo = Arc::new(MockWithdrawalRepository::with_records(vec![
            stale, settled, fresh,
        ]));
        let handler = ListWithdrawalsHandler::new(repo);

        let records = handler
            .handle(ListWithdrawalsQuery {
                caller: AuthContext::admin(UserId::new(99)),
                stale_only: true,
                stale_after_minutes: 60,
            })
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, stale_id);
    }

    #[tokio::test]
    async fn listing_requires_admin() {
        let repo = Arc::new(MockWithdrawalRepository::with_records(vec![]));
        let handler = ListWithdrawalsHandler::new(repo);

        let result = handler
            .handle(ListWithdrawalsQuery {
                caller: AuthContext::user(UserId::new(20)),
                stale_only: false,
                stale_after_minutes: 60,
            })
            .await;
        assert!(matches!(result, Err(WithdrawalError::Unauthorized(_))));
    }
}
