//! HTTP DTOs for point ledger endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::ledger::LedgerEntry;

/// Request to adjust a user's balance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPointsRequest {
    pub user_id: i64,
    /// Signed delta; positive credits, negative debits.
    pub delta: i64,
    pub reason: String,
}

/// Applied ledger entry view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    pub entry_id: String,
    pub user_id: i64,
    pub actor: String,
    pub delta: i64,
    pub balance_after: i64,
    pub reason: String,
    pub created_at: String,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            entry_id: entry.id.to_string(),
            user_id: entry.user_id.as_i64(),
            actor: entry.actor.to_string(),
            delta: entry.delta,
            balance_after: entry.balance_after,
            reason: entry.reason,
            created_at: entry.created_at.as_datetime().to_rfc3339(),
        }
    }
}
