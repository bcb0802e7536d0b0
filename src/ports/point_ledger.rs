//! Point ledger port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::ledger::{LedgerActor, LedgerEntry};

/// Atomic balance mutation with an audit entry.
///
/// Implementations must serialize concurrent mutations to the same user's
/// balance - lost updates are not acceptable - and must reject any mutation
/// that would drive the balance negative (`InsufficientBalance`).
#[async_trait]
pub trait PointLedger: Send + Sync {
    /// Adds points to a user's balance.
    async fn credit(
        &self,
        user_id: UserId,
        amount: i64,
        actor: LedgerActor,
        reason: &str,
    ) -> Result<LedgerEntry, DomainError>;

    /// Removes points from a user's balance.
    ///
    /// # Errors
    ///
    /// Returns an `InsufficientBalance` error when the balance would go
    /// negative; the balance is left untouched.
    async fn debit(
        &self,
        user_id: UserId,
        amount: i64,
        actor: LedgerActor,
        reason: &str,
    ) -> Result<LedgerEntry, DomainError>;
}
