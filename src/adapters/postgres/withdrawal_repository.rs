//! PostgreSQL implementation of WithdrawalRepository.
//!
//! Carries the two concurrency-control primitives of the settlement design:
//!
//! - `withdraw_records.task_id` is UNIQUE, so the first of two racing
//!   submissions wins the insert and the loser maps to `WithdrawalExists`;
//! - settlement is a conditional `UPDATE ... WHERE status = 'processing'`,
//!   so duplicate notification deliveries collapse to one transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, TaskId, Timestamp, UserId, WithdrawId};
use crate::domain::task::TaskStatus;
use crate::domain::withdrawal::{SettlementOutcome, WithdrawRecord, WithdrawStatus};
use crate::ports::{SettleResult, WithdrawalFilter, WithdrawalRepository};

use super::task_repository::status_to_string as task_status_to_string;

const TASK_ID_UNIQUE_CONSTRAINT: &str = "withdraw_records_task_id_key";

const RECORD_COLUMNS: &str = "id, task_id, user_id, amount, fee, actual_amount, account_type, \
                              account_info, status, reference, gateway_order_id, gateway_payload, \
                              created_at, updated_at";

/// PostgreSQL implementation of the WithdrawalRepository port.
pub struct PostgresWithdrawalRepository {
    pool: PgPool,
}

impl PostgresWithdrawalRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a withdrawal record.
#[derive(Debug, sqlx::FromRow)]
struct WithdrawRecordRow {
    id: Uuid,
    task_id: i64,
    user_id: i64,
    amount: Decimal,
    fee: Option<Decimal>,
    actual_amount: Option<Decimal>,
    account_type: String,
    account_info: String,
    status: String,
    reference: String,
    gateway_order_id: Option<String>,
    gateway_payload: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WithdrawRecordRow> for WithdrawRecord {
    type Error = DomainError;

    fn try_from(row: WithdrawRecordRow) -> Result<Self, Self::Error> {
        Ok(WithdrawRecord {
            id: WithdrawId::from_uuid(row.id),
            task_id: TaskId::new(row.task_id),
            user_id: UserId::new(row.user_id),
            amount: row.amount,
            fee: row.fee,
            actual_amount: row.actual_amount,
            account_type: row.account_type,
            account_info: row.account_info,
            status: parse_status(&row.status)?,
            reference: row.reference,
            gateway_order_id: row.gateway_order_id,
            gateway_payload: row.gateway_payload,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<WithdrawStatus, DomainError> {
    match s {
        "processing" => Ok(WithdrawStatus::Processing),
        "success" => Ok(WithdrawStatus::Success),
        "failed" => Ok(WithdrawStatus::Failed),
        "closed" => Ok(WithdrawStatus::Closed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid withdrawal status value: {}", s),
        )),
    }
}

fn status_to_string(status: &WithdrawStatus) -> &'static str {
    match status {
        WithdrawStatus::Processing => "processing",
        WithdrawStatus::Success => "success",
        WithdrawStatus::Failed => "failed",
        WithdrawStatus::Closed => "closed",
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// Advances the task row inside an open settlement transaction.
async fn advance_task_status(
    tx: &mut Transaction<'_, Postgres>,
    task_id: TaskId,
    status: TaskStatus,
) -> Result<(), DomainError> {
    sqlx::query("UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(task_id.as_i64())
        .bind(task_status_to_string(&status))
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to advance task status", e))?;
    Ok(())
}

#[async_trait]
impl WithdrawalRepository for PostgresWithdrawalRepository {
    async fn create_processing(&self, record: &WithdrawRecord) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO withdraw_records (
                id, task_id, user_id, amount, fee, actual_amount, account_type,
                account_info, status, reference, gateway_order_id, gateway_payload,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.task_id.as_i64())
        .bind(record.user_id.as_i64())
        .bind(record.amount)
        .bind(record.fee)
        .bind(record.actual_amount)
        .bind(&record.account_type)
        .bind(&record.account_info)
        .bind(status_to_string(&record.status))
        .bind(&record.reference)
        .bind(&record.gateway_order_id)
        .bind(&record.gateway_payload)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(TASK_ID_UNIQUE_CONSTRAINT) {
                    return DomainError::new(
                        ErrorCode::WithdrawalExists,
                        "A withdrawal already exists for this task",
                    );
                }
            }
            db_error("Failed to insert withdrawal", e)
        })?;

        // The task must still be in a confirmed state; a concurrent transition
        // (e.g. an admin reopening the task) voids the submission.
        let updated = sqlx::query(
            r#"
            UPDATE tasks SET status = 'withdraw_requested', updated_at = NOW()
            WHERE id = $1 AND status IN ('author_confirmed', 'admin_confirmed')
            "#,
        )
        .bind(record.task_id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to mark task withdraw-requested", e))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back", e))?;
            return Err(DomainError::new(
                ErrorCode::TaskNotWithdrawable,
                "Task left its confirmed state before the withdrawal was recorded",
            ));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit", e))?;
        Ok(())
    }

    async fn attach_gateway_receipt(
        &self,
        id: WithdrawId,
        gateway_order_id: &str,
        fee: Decimal,
        actual_amount: Decimal,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE withdraw_records
            SET gateway_order_id = $2, fee = $3, actual_amount = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(gateway_order_id)
        .bind(fee)
        .bind(actual_amount)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to attach gateway receipt", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::WithdrawalNotFound,
                "No processing withdrawal to attach receipt to",
            ));
        }
        Ok(())
    }

    async fn try_settle(
        &self,
        task_id: TaskId,
        outcome: SettlementOutcome,
        gateway_order_id: Option<&str>,
        gateway_payload: Option<&str>,
    ) -> Result<SettleResult, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // The compare-and-swap: only a still-processing record moves.
        let row: Option<WithdrawRecordRow> = sqlx::query_as(&format!(
            r#"
            UPDATE withdraw_records
            SET status = $2,
                gateway_order_id = COALESCE($3, gateway_order_id),
                gateway_payload = COALESCE($4, gateway_payload),
                updated_at = NOW()
            WHERE task_id = $1 AND status = 'processing'
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(task_id.as_i64())
        .bind(status_to_string(&outcome.record_status()))
        .bind(gateway_order_id)
        .bind(gateway_payload)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to settle withdrawal", e))?;

        match row {
            Some(row) => {
                advance_task_status(&mut tx, task_id, outcome.task_status()).await?;
                tx.commit()
                    .await
                    .map_err(|e| db_error("Failed to commit", e))?;
                Ok(SettleResult::Applied(row.try_into()?))
            }
            None => {
                let status: Option<(String,)> =
                    sqlx::query_as("SELECT status FROM withdraw_records WHERE task_id = $1")
                        .bind(task_id.as_i64())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| db_error("Failed to read withdrawal status", e))?;
                tx.rollback()
                    .await
                    .map_err(|e| db_error("Failed to roll back", e))?;

                match status {
                    Some((s,)) => Ok(SettleResult::AlreadyTerminal(parse_status(&s)?)),
                    None => Ok(SettleResult::NotFound),
                }
            }
        }
    }

    async fn find_by_id(&self, id: WithdrawId) -> Result<Option<WithdrawRecord>, DomainError> {
        let row: Option<WithdrawRecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM withdraw_records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find withdrawal", e))?;

        row.map(WithdrawRecord::try_from).transpose()
    }

    async fn find_by_task_id(
        &self,
        task_id: TaskId,
    ) -> Result<Option<WithdrawRecord>, DomainError> {
        let row: Option<WithdrawRecordRow> = sqlx::query_as(&format!(
            "SELECT {} FROM withdraw_records WHERE task_id = $1",
            RECORD_COLUMNS
        ))
        .bind(task_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find withdrawal", e))?;

        row.map(WithdrawRecord::try_from).transpose()
    }

    async fn list(&self, filter: WithdrawalFilter) -> Result<Vec<WithdrawRecord>, DomainError> {
        let rows: Vec<WithdrawRecordRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM withdraw_records
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC
            "#,
            RECORD_COLUMNS
        ))
        .bind(filter.status.as_ref().map(status_to_string))
        .bind(filter.created_before.map(|t| *t.as_datetime()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list withdrawals", e))?;

        rows.into_iter().map(WithdrawRecord::try_from).collect()
    }
}
