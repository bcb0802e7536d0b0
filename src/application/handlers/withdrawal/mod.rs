//! Withdrawal command and query handlers.

mod get_withdrawal;
mod handle_gateway_notification;
mod reconcile_withdrawal;
mod settlement;
mod submit_withdrawal;

pub use get_withdrawal::{
    GetWithdrawalHandler, GetWithdrawalQuery, ListWithdrawalsHandler, ListWithdrawalsQuery,
};
pub use handle_gateway_notification::{
    GatewayNotificationCommand, HandleGatewayNotificationHandler, NotificationOutcome,
};
pub use reconcile_withdrawal::{
    ReconcileOutcome, ReconcileWithdrawalCommand, ReconcileWithdrawalHandler,
};
pub use settlement::{AppliedSettlement, SettlementService};
pub use submit_withdrawal::{
    SubmitWithdrawalCommand, SubmitWithdrawalHandler, SubmitWithdrawalResult,
};
