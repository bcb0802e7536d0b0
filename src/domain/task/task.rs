//! Task entity.

use crate::domain::foundation::{StateMachine, TaskId, Timestamp, UserId, ValidationError};

use super::status::{ConfirmationMode, TaskStatus};

/// A unit of paid work whose confirmed completion becomes eligible for payout.
///
/// A task has exactly one assignee once claimed; the assignee is the payee of
/// any later withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub author_id: UserId,
    pub assignee: Option<UserId>,
    pub points: i64,
    pub status: TaskStatus,
    pub confirmation: ConfirmationMode,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Creates a freshly published task.
    pub fn publish(
        id: TaskId,
        title: impl Into<String>,
        author_id: UserId,
        points: i64,
        confirmation: ConfirmationMode,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            title: title.into(),
            author_id,
            assignee: None,
            points,
            status: TaskStatus::Published,
            confirmation,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns the task to a worker.
    pub fn claim(&mut self, assignee: UserId) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::Claimed)?;
        self.assignee = Some(assignee);
        self.touch();
        Ok(())
    }

    /// Marks the delivered work as submitted for confirmation.
    pub fn submit_work(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::Submitted)?;
        self.touch();
        Ok(())
    }

    /// Records the author's confirmation of the delivered work.
    pub fn confirm_by_author(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::AuthorConfirmed)?;
        self.touch();
        Ok(())
    }

    /// Records an admin's confirmation of the delivered work.
    pub fn confirm_by_admin(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::AdminConfirmed)?;
        self.touch();
        Ok(())
    }

    /// Advances the task to the withdraw-requested marker.
    pub fn request_withdrawal(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::WithdrawRequested)?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
