//! Ports: trait boundaries between the application core and the outside
//! world (database, payment gateway, auth provider).

mod auth_verifier;
mod payment_gateway;
mod point_ledger;
mod task_repository;
mod withdrawal_repository;

pub use auth_verifier::AuthVerifier;
pub use payment_gateway::{
    GatewayError, PaymentGateway, TransferReceipt, TransferRequest, TransferState,
};
pub use point_ledger::PointLedger;
pub use task_repository::TaskRepository;
pub use withdrawal_repository::{SettleResult, WithdrawalFilter, WithdrawalRepository};
