//! Gateway business reference codec.
//!
//! The reference binds a gateway transaction to an internal task:
//! `WITHDRAW_<taskId>_<suffix>`. Decoding fails closed - anything that does
//! not match the pattern is rejected, never coerced to a best-effort id.

use uuid::Uuid;

use crate::domain::foundation::TaskId;

use super::errors::WithdrawalError;

const PREFIX: &str = "WITHDRAW_";

/// Encodes a task id into a fresh, unique business reference.
///
/// The random suffix makes each submission's out_trade_no unique at the
/// gateway even across environments sharing a task id space.
pub fn encode(task_id: TaskId) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}_{}", PREFIX, task_id, &suffix[..8])
}

/// Decodes a business reference back into a task id.
pub fn decode(reference: &str) -> Result<TaskId, WithdrawalError> {
    let rest = reference
        .strip_prefix(PREFIX)
        .ok_or_else(|| WithdrawalError::invalid_reference(reference))?;

    let (id_part, suffix) = rest
        .split_once('_')
        .ok_or_else(|| WithdrawalError::invalid_reference(reference))?;

    if suffix.is_empty() || !id_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WithdrawalError::invalid_reference(reference));
    }

    let id: i64 = id_part
        .parse()
        .map_err(|_| WithdrawalError::invalid_reference(reference))?;
    if id == 0 {
        return Err(WithdrawalError::invalid_reference(reference));
    }

    Ok(TaskId::new(id))
}
