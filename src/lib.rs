//! TaskPay - administrative backend for task payouts.
//!
//! The core subsystem validates payout eligibility, submits disbursements to
//! an external payment gateway, and idempotently reconciles the gateway's
//! asynchronous outcome notifications against task and ledger state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
