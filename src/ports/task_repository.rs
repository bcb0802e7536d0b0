//! Task repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TaskId};
use crate::domain::task::Task;

/// Read access to tasks for the settlement subsystem.
///
/// Task CRUD lives elsewhere in the admin surface; settlement only needs to
/// load a task to validate eligibility and to know the payee and point value.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Loads a task by id.
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, DomainError>;
}
