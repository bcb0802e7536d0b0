//! Foundation types shared across the domain.
//!
//! Value objects (ids, timestamps), the error scheme, and the state machine
//! trait that lifecycle statuses implement.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::AuthContext;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{TaskId, UserId, WithdrawId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
