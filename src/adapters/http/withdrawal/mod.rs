//! HTTP surface for the withdrawal settlement subsystem.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{notification_routes, withdrawal_routes};
