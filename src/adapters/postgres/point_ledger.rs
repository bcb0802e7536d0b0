//! PostgreSQL implementation of PointLedger.
//!
//! Balance mutation and audit entry happen in one transaction with a row
//! lock on the user, which serializes concurrent mutations to the same
//! balance and makes the non-negative invariant race-free.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::ledger::{LedgerActor, LedgerEntry};
use crate::ports::PointLedger;

/// PostgreSQL implementation of the PointLedger port.
pub struct PostgresPointLedger {
    pool: PgPool,
}

impl PostgresPointLedger {
    /// Creates a new ledger with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply(
        &self,
        user_id: UserId,
        delta: i64,
        actor: LedgerActor,
        reason: &str,
    ) -> Result<LedgerEntry, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to begin transaction: {}", e))
        })?;

        let row: Option<(i64,)> =
            sqlx::query_as("SELECT points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to lock user balance: {}", e),
                    )
                })?;

        let (balance,) = row.ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", user_id))
        })?;

        let new_balance = balance + delta;
        if new_balance < 0 {
            return Err(DomainError::new(
                ErrorCode::InsufficientBalance,
                format!(
                    "Balance of user {} is {}, cannot apply delta {}",
                    user_id, balance, delta
                ),
            ));
        }

        sqlx::query("UPDATE users SET points = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id.as_i64())
            .bind(new_balance)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to update balance: {}", e),
                )
            })?;

        let entry = LedgerEntry::new(user_id, actor, delta, new_balance, reason);
        sqlx::query(
            r#"
            INSERT INTO point_ledger (id, user_id, actor, delta, balance_after, reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id.as_i64())
        .bind(entry.actor.to_string())
        .bind(entry.delta)
        .bind(entry.balance_after)
        .bind(&entry.reason)
        .bind(entry.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to write ledger entry: {}", e),
            )
        })?;

        tx.commit().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to commit: {}", e))
        })?;

        Ok(entry)
    }
}

#[async_trait]
impl PointLedger for PostgresPointLedger {
    async fn credit(
        &self,
        user_id: UserId,
        amount: i64,
        actor: LedgerActor,
        reason: &str,
    ) -> Result<LedgerEntry, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("amount", "credit must be positive"));
        }
        self.apply(user_id, amount, actor, reason).await
    }

    async fn debit(
        &self,
        user_id: UserId,
        amount: i64,
        actor: LedgerActor,
        reason: &str,
    ) -> Result<LedgerEntry, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("amount", "debit must be positive"));
        }
        self.apply(user_id, -amount, actor, reason).await
    }
}
