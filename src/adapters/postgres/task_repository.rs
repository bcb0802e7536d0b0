//! PostgreSQL implementation of TaskRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, TaskId, Timestamp, UserId};
use crate::domain::task::{ConfirmationMode, Task, TaskStatus};
use crate::ports::TaskRepository;

/// PostgreSQL implementation of the TaskRepository port.
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a task.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    author_id: i64,
    assignee_id: Option<i64>,
    points: i64,
    status: String,
    confirmation: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId::new(row.id),
            title: row.title,
            author_id: UserId::new(row.author_id),
            assignee: row.assignee_id.map(UserId::new),
            points: row.points,
            status: parse_status(&row.status)?,
            confirmation: parse_confirmation(&row.confirmation)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

pub(super) fn parse_status(s: &str) -> Result<TaskStatus, DomainError> {
    match s {
        "published" => Ok(TaskStatus::Published),
        "claimed" => Ok(TaskStatus::Claimed),
        "submitted" => Ok(TaskStatus::Submitted),
        "author_confirmed" => Ok(TaskStatus::AuthorConfirmed),
        "admin_confirmed" => Ok(TaskStatus::AdminConfirmed),
        "withdraw_requested" => Ok(TaskStatus::WithdrawRequested),
        "settled" => Ok(TaskStatus::Settled),
        "payout_failed" => Ok(TaskStatus::PayoutFailed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid task status value: {}", s),
        )),
    }
}

pub(super) fn status_to_string(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::Published => "published",
        TaskStatus::Claimed => "claimed",
        TaskStatus::Submitted => "submitted",
        TaskStatus::AuthorConfirmed => "author_confirmed",
        TaskStatus::AdminConfirmed => "admin_confirmed",
        TaskStatus::WithdrawRequested => "withdraw_requested",
        TaskStatus::Settled => "settled",
        TaskStatus::PayoutFailed => "payout_failed",
    }
}

fn parse_confirmation(s: &str) -> Result<ConfirmationMode, DomainError> {
    match s {
        "admin_only" => Ok(ConfirmationMode::AdminOnly),
        "author_required" => Ok(ConfirmationMode::AuthorRequired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid confirmation mode value: {}", s),
        )),
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, DomainError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, title, author_id, assignee_id, points, status, confirmation,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find task: {}", e))
        })?;

        row.map(Task::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_all_stored_values() {
        for (s, expected) in [
            ("published", TaskStatus::Published),
            ("claimed", TaskStatus::Claimed),
            ("submitted", TaskStatus::Submitted),
            ("author_confirmed", TaskStatus::AuthorConfirmed),
            ("admin_confirmed", TaskStatus::AdminConfirmed),
            ("withdraw_requested", TaskStatus::WithdrawRequested),
            ("settled", TaskStatus::Settled),
            ("payout_failed", TaskStatus::PayoutFailed),
        ] {
            assert_eq!(parse_status(s).unwrap(), expected);
        }
    }

    #[test]
    fn parse_status_rejects_unknown_values() {
        assert!(parse_status("archived").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn status_roundtrips_through_strings() {
        for status in [
            TaskStatus::Published,
            TaskStatus::Claimed,
            TaskStatus::Submitted,
            TaskStatus::AuthorConfirmed,
            TaskStatus::AdminConfirmed,
            TaskStatus::WithdrawRequested,
            TaskStatus::Settled,
            TaskStatus::PayoutFailed,
        ] {
            assert_eq!(parse_status(status_to_string(&status)).unwrap(), status);
        }
    }

    #[test]
    fn parse_confirmation_accepts_both_modes() {
        assert_eq!(
            parse_confirmation("admin_only").unwrap(),
            ConfirmationMode::AdminOnly
        );
        assert_eq!(
            parse_confirmation("author_required").unwrap(),
            ConfirmationMode::AuthorRequired
        );
        assert!(parse_confirmation("none").is_err());
    }
}
