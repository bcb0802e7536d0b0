//! Point ledger domain.
//!
//! Balances move only through the ledger: every mutation is paired with an
//! append-only audit entry recording who moved how many points and why.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, UserId};

/// Who initiated a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerActor {
    /// The settlement subsystem, applying a gateway outcome.
    Settlement,
    /// An admin making a manual adjustment.
    Admin(UserId),
}

impl std::fmt::Display for LedgerActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerActor::Settlement => write!(f, "settlement"),
            LedgerActor::Admin(id) => write!(f, "admin:{}", id),
        }
    }
}

/// One audit entry for a balance change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub actor: LedgerActor,
    /// Signed point delta; positive credits, negative debits.
    pub delta: i64,
    /// Balance after applying the delta.
    pub balance_after: i64,
    pub reason: String,
    pub created_at: Timestamp,
}

impl LedgerEntry {
    /// Creates an entry for an applied balance change.
    pub fn new(
        user_id: UserId,
        actor: LedgerActor,
        delta: i64,
        balance_after: i64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            actor,
            delta,
            balance_after,
            reason: reason.into(),
            created_at: Timestamp::now(),
        }
    }
}
