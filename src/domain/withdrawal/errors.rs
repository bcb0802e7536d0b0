//! Withdrawal-specific error types.
//!
//! The full settlement error taxonomy: validation, authorization, state and
//! conflict errors surface to the caller; signature and gateway errors are
//! logged with their payload before they surface.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | InvalidReference | 400 |
//! | Unauthorized | 403 |
//! | TaskNotFound / NotFound | 404 |
//! | AlreadyRequested | 409 |
//! | NotWithdrawable | 409 |
//! | InvalidState | 409 |
//! | InsufficientBalance | 400 |
//! | SignatureRejected | 401 |
//! | Gateway | 502 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, TaskId, WithdrawId};
use crate::domain::task::TaskStatus;

/// Withdrawal and settlement errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    /// The referenced task does not exist.
    TaskNotFound(TaskId),

    /// The withdrawal record does not exist.
    NotFound(WithdrawId),

    /// A withdrawal record already exists for this task (any status).
    ///
    /// Retry goes through reconciliation, never a fresh submission.
    AlreadyRequested(TaskId),

    /// The task is not in a withdrawable state.
    NotWithdrawable {
        task_id: TaskId,
        status: TaskStatus,
    },

    /// The caller may not act on this withdrawal.
    Unauthorized(String),

    /// Request validation failed.
    ValidationFailed {
        field: String,
        message: String,
    },

    /// The gateway business reference does not match the expected pattern.
    InvalidReference(String),

    /// Notification signature verification failed.
    ///
    /// Indicates either misconfiguration or a forged notification; callers
    /// must log the payload and reject without crashing.
    SignatureRejected {
        reason: String,
    },

    /// Submission to or query of the payment gateway failed.
    Gateway {
        reason: String,
        retryable: bool,
    },

    /// A ledger mutation would drive the balance negative.
    InsufficientBalance(String),

    /// Invalid state for the requested record transition.
    InvalidState {
        current: String,
        attempted: String,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl WithdrawalError {
    // Constructor functions for cleaner error creation

    pub fn task_not_found(id: TaskId) -> Self {
        WithdrawalError::TaskNotFound(id)
    }

    pub fn not_found(id: WithdrawId) -> Self {
        WithdrawalError::NotFound(id)
    }

    pub fn already_requested(task_id: TaskId) -> Self {
        WithdrawalError::AlreadyRequested(task_id)
    }

    pub fn not_withdrawable(task_id: TaskId, status: TaskStatus) -> Self {
        WithdrawalError::NotWithdrawable { task_id, status }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        WithdrawalError::Unauthorized(reason.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WithdrawalError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_reference(reference: impl Into<String>) -> Self {
        WithdrawalError::InvalidReference(reference.into())
    }

    pub fn signature_rejected(reason: impl Into<String>) -> Self {
        WithdrawalError::SignatureRejected {
            reason: reason.into(),
        }
    }

    pub fn gateway(reason: impl Into<String>, retryable: bool) -> Self {
        WithdrawalError::Gateway {
            reason: reason.into(),
            retryable,
        }
    }

    pub fn insufficient_balance(message: impl Into<String>) -> Self {
        WithdrawalError::InsufficientBalance(message.into())
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        WithdrawalError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        WithdrawalError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            WithdrawalError::TaskNotFound(_) => ErrorCode::TaskNotFound,
            WithdrawalError::NotFound(_) => ErrorCode::WithdrawalNotFound,
            WithdrawalError::AlreadyRequested(_) => ErrorCode::WithdrawalExists,
            WithdrawalError::NotWithdrawable { .. } => ErrorCode::TaskNotWithdrawable,
            WithdrawalError::Unauthorized(_) => ErrorCode::Forbidden,
            WithdrawalError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            WithdrawalError::InvalidReference(_) => ErrorCode::InvalidReference,
            WithdrawalError::SignatureRejected { .. } => ErrorCode::SignatureRejected,
            WithdrawalError::Gateway { .. } => ErrorCode::GatewayFailed,
            WithdrawalError::InsufficientBalance(_) => ErrorCode::InsufficientBalance,
            WithdrawalError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            WithdrawalError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            WithdrawalError::TaskNotFound(id) => format!("Task not found: {}", id),
            WithdrawalError::NotFound(id) => format!("Withdrawal not found: {}", id),
            WithdrawalError::AlreadyRequested(task_id) => {
                format!("A withdrawal already exists for task {}", task_id)
            }
            WithdrawalError::NotWithdrawable { task_id, status } => {
                format!("Task {} is not withdrawable in status {:?}", task_id, status)
            }
            WithdrawalError::Unauthorized(reason) => format!("Not allowed: {}", reason),
            WithdrawalError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            WithdrawalError::InvalidReference(reference) => {
                format!("Malformed gateway reference: '{}'", reference)
            }
            WithdrawalError::SignatureRejected { reason } => {
                format!("Notification signature rejected: {}", reason)
            }
            WithdrawalError::Gateway { reason, .. } => format!("Gateway error: {}", reason),
            WithdrawalError::InsufficientBalance(message) => {
                format!("Insufficient balance: {}", message)
            }
            WithdrawalError::InvalidState { current, attempted } => {
                format!("Cannot {} a withdrawal in {} state", attempted, current)
            }
            WithdrawalError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if a retry of the failed operation could plausibly succeed.
    ///
    /// Drives the callback acknowledgement policy: only retryable failures
    /// answer the gateway with its retry-triggering token.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WithdrawalError::Infrastructure(_)
                | WithdrawalError::Gateway { retryable: true, .. }
        )
    }
}

impl std::fmt::Display for WithdrawalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for WithdrawalError {}

impl From<DomainError> for WithdrawalError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InsufficientBalance => {
                WithdrawalError::InsufficientBalance(err.message)
            }
            ErrorCode::Unauthorized | ErrorCode::Forbidden => {
                WithdrawalError::Unauthorized(err.message)
            }
            ErrorCode::SignatureRejected => WithdrawalError::SignatureRejected {
                reason: err.message,
            },
            ErrorCode::GatewayFailed => WithdrawalError::Gateway {
                reason: err.message,
                retryable: false,
            },
            ErrorCode::ValidationFailed => WithdrawalError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => WithdrawalError::Infrastructure(err.to_string()),
        }
    }
}

impl From<WithdrawalError> for DomainError {
    fn from(err: WithdrawalError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_requested_carries_conflict_code() {
        let err = WithdrawalError::already_requested(TaskId::new(10));
        assert_eq!(err.code(), ErrorCode::WithdrawalExists);
        assert!(err.message().contains("task 10"));
    }

    #[test]
    fn not_withdrawable_names_task_and_status() {
        let err = WithdrawalError::not_withdrawable(TaskId::new(11), TaskStatus::Claimed);
        assert_eq!(err.code(), ErrorCode::TaskNotWithdrawable);
        assert!(err.message().contains("11"));
        assert!(err.message().contains("Claimed"));
    }

    #[test]
    fn signature_rejected_is_not_retryable() {
        let err = WithdrawalError::signature_rejected("signature mismatch");
        assert_eq!(err.code(), ErrorCode::SignatureRejected);
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_gateway_errors_are_retryable() {
        assert!(WithdrawalError::gateway("timeout", true).is_retryable());
        assert!(!WithdrawalError::gateway("account rejected", false).is_retryable());
    }

    #[test]
    fn infrastructure_errors_are_retryable() {
        assert!(WithdrawalError::infrastructure("connection lost").is_retryable());
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        assert!(!WithdrawalError::validation("amount", "must be positive").is_retryable());
    }

    #[test]
    fn display_matches_message() {
        let err = WithdrawalError::invalid_reference("482_WITHDRAW");
        assert_eq!(format!("{}", err), err.message());
    }

    #[test]
    fn converts_to_domain_error_with_matching_code() {
        let err = WithdrawalError::task_not_found(TaskId::new(3));
        let domain_err: DomainError = err.clone().into();
        assert_eq!(domain_err.code, err.code());
    }

    #[test]
    fn converts_from_insufficient_balance_domain_error() {
        let domain_err = DomainError::new(ErrorCode::InsufficientBalance, "balance 5, requested 8");
        let err: WithdrawalError = domain_err.into();
        assert!(matches!(err, WithdrawalError::InsufficientBalance(_)));
    }

    #[test]
    fn converts_unknown_domain_error_to_infrastructure() {
        let domain_err = DomainError::new(ErrorCode::DatabaseError, "connection refused");
        let err: WithdrawalError = domain_err.into();
        assert!(matches!(err, WithdrawalError::Infrastructure(_)));
    }
}
