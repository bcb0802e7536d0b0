//! Withdrawal settlement domain.
//!
//! Everything between "this task's payout may start" and "the gateway's
//! outcome has been applied exactly once": eligibility rules, the withdrawal
//! record state machine, the gateway reference codec, and notification
//! authentication.

mod eligibility;
mod errors;
mod notification;
mod record;
pub mod reference;
mod signature;

pub use eligibility::{can_withdraw, WithdrawalValidator};
pub use errors::WithdrawalError;
pub use notification::{BizContent, GatewayNotification, TradeStatus, SIGN_FIELD, SIGN_TYPE_FIELD};
pub use record::{SettlementOutcome, WithdrawRecord, WithdrawStatus};
pub use signature::SignatureVerifier;
