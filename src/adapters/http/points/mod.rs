//! HTTP surface for the point ledger.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::points_routes;
