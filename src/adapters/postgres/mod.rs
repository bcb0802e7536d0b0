//! PostgreSQL adapters for the repository and ledger ports.

mod point_ledger;
mod task_repository;
mod withdrawal_repository;

pub use point_ledger::PostgresPointLedger;
pub use task_repository::PostgresTaskRepository;
pub use withdrawal_repository::PostgresWithdrawalRepository;
